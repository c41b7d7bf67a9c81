//! Optimizers of the critics, the error networks and the policy.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Optimizer and its learning rate, as written in config files.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam from `candle-optimisers`.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// AdamW from `candle-nn`. Betas and epsilon take their default values.
    AdamW {
        /// Learning rate.
        lr: f64,

        /// Decoupled weight decay.
        weight_decay: f64,
    },
}

impl OptimizerConfig {
    /// Builds the optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match *self {
            Self::Adam { lr } => {
                let params = ParamsAdam {
                    lr,
                    ..ParamsAdam::default()
                };
                Ok(Optimizer::Adam(Adam::new(vars, params)?))
            }
            Self::AdamW { lr, weight_decay } => {
                let params = ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                };
                Ok(Optimizer::AdamW(AdamW::new(vars, params)?))
            }
        }
    }

    /// Replaces the learning rate, keeping the other parameters.
    pub fn learning_rate(mut self, new_lr: f64) -> Self {
        match &mut self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => *lr = new_lr,
        }
        self
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 3e-4 }
    }
}

/// An optimizer built from [`OptimizerConfig`].
///
/// [`Optimizer::backward_step`] computes a fresh gradient store from the loss
/// on every call, so gradients never accumulate across steps.
pub enum Optimizer {
    /// Adam.
    Adam(Adam),

    /// AdamW.
    AdamW(AdamW),
}

impl Optimizer {
    /// Computes gradients of `loss` and steps the variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    fn descends(config: OptimizerConfig) -> Result<()> {
        let x = Var::new(&[2f32], &Device::Cpu)?;
        let mut opt = config.build(vec![x.clone()])?;
        for _ in 0..3 {
            opt.backward_step(&x.as_tensor().sqr()?.sum_all()?)?;
        }
        assert!(x.as_tensor().to_vec1::<f32>()?[0] < 2.0);
        Ok(())
    }

    #[test]
    fn test_backward_step() -> Result<()> {
        descends(OptimizerConfig::default().learning_rate(0.1))?;
        descends(OptimizerConfig::AdamW {
            lr: 0.1,
            weight_decay: 0.0,
        })
    }

    #[test]
    fn test_learning_rate() {
        assert_eq!(
            OptimizerConfig::AdamW {
                lr: 1e-3,
                weight_decay: 0.01
            }
            .learning_rate(0.5),
            OptimizerConfig::AdamW {
                lr: 0.5,
                weight_decay: 0.01
            }
        );
        assert_eq!(
            OptimizerConfig::default().learning_rate(1e-3),
            OptimizerConfig::Adam { lr: 1e-3 }
        );
    }
}
