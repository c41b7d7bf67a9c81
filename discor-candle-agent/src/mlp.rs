//! Multilayer perceptron.
mod base;
mod config;
mod mlp2;
use anyhow::Result;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
pub use config::MlpConfig;
pub use mlp2::Mlp2;

/// Linear layers `in_dim -> units[0] -> .. -> out_dim`, named `ln{i}`.
fn create_linear_layers(vb: &VarBuilder, dims: &[usize]) -> Result<Vec<Linear>> {
    dims.windows(2)
        .enumerate()
        .map(|(i, w)| Ok(linear(w[0], w[1], vb.pp(format!("ln{}", i)))?))
        .collect()
}

/// ReLU after every layer except the last.
fn mlp_forward(xs: &Tensor, layers: &[Linear]) -> Result<Tensor> {
    let mut xs = xs.clone();
    for (i, layer) in layers.iter().enumerate() {
        xs = layer.forward(&xs)?;
        if i + 1 < layers.len() {
            xs = xs.relu()?;
        }
    }
    Ok(xs)
}
