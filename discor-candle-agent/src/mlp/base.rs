use super::{create_linear_layers, mlp_forward, MlpConfig};
use crate::model::SubModel2;
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::{Linear, VarBuilder};

/// Multilayer perceptron with ReLU activation function.
///
/// As a [`SubModel2`], the two inputs are concatenated along the last axis,
/// so `in_dim` must be the sum of their sizes.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl SubModel2 for Mlp {
    type Config = MlpConfig;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let layers = create_linear_layers(&vb.pp("mlp"), &config.dims())?;
        Ok(Self {
            config,
            device,
            layers,
        })
    }

    fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        let xs = Tensor::cat(&[obs.to_device(&self.device)?, act.to_device(&self.device)?], D::Minus1)?;
        let xs = mlp_forward(&xs, &self.layers)?;

        match self.config.activation_out {
            false => Ok(xs),
            true => Ok(xs.relu()?),
        }
    }
}
