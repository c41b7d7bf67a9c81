use super::{create_linear_layers, mlp_forward, MlpConfig};
use crate::model::SubModel1;
use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Multilayer perceptron with a mean head and a log standard deviation head.
///
/// The hidden layers are shared. `activation_out` is not used.
pub struct Mlp2 {
    device: Device,
    layers: Vec<Linear>,
    head_mean: Linear,
    head_lstd: Linear,
}

impl SubModel1 for Mlp2 {
    type Config = MlpConfig;
    type Output = (Tensor, Tensor);

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let mut dims = config.dims();
        dims.pop();
        let layers = create_linear_layers(&vb.pp("mlp"), &dims)?;
        let in_dim = *config.units.last().context("units of Mlp2 must not be empty")?;
        let head_mean = linear(in_dim, config.out_dim, vb.pp("mean"))?;
        let head_lstd = linear(in_dim, config.out_dim, vb.pp("lstd"))?;

        Ok(Self {
            device,
            layers,
            head_mean,
            head_lstd,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<Self::Output> {
        let xs = mlp_forward(&xs.to_device(&self.device)?, &self.layers)?.relu()?;
        Ok((self.head_mean.forward(&xs)?, self.head_lstd.forward(&xs)?))
    }
}
