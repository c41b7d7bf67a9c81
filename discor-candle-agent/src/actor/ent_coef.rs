//! Entropy coefficient.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{init::Init, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};

/// Mode of the entropy coefficient.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EntCoefMode {
    /// Use a constant as alpha.
    Fix(f64),

    /// Automatic tuning given `(target_entropy, learning_rate)`.
    Auto(f64, f64),
}

/// The entropy coefficient, held as `log(alpha)`.
pub struct EntCoef {
    _varmap: VarMap,
    log_alpha: Tensor,
    target_entropy: Option<f64>,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Constructs an instance of `EntCoef`.
    pub fn new(mode: EntCoefMode, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let (log_alpha, target_entropy, opt) = match mode {
            EntCoefMode::Fix(alpha) => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(alpha.ln()))?;
                (log_alpha, None, None)
            }
            EntCoefMode::Auto(target_entropy, learning_rate) => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(0.0))?;
                let opt = OptimizerConfig::default()
                    .learning_rate(learning_rate)
                    .build(varmap.all_vars())?;
                (log_alpha, Some(target_entropy), Some(opt))
            }
        };

        Ok(Self {
            _varmap: varmap,
            log_alpha,
            target_entropy,
            opt,
        })
    }

    /// Returns the entropy coefficient.
    pub fn alpha(&self) -> Result<f64> {
        let alpha = self.log_alpha.detach().exp()?.sum_all()?.to_scalar::<f32>()?;
        Ok(alpha as f64)
    }

    /// Updates `log(alpha)` toward the target entropy given log probabilities
    /// of sampled actions. Does nothing in [`EntCoefMode::Fix`].
    pub fn update(&mut self, logp: &Tensor) -> Result<()> {
        if let (Some(target_entropy), Some(opt)) = (self.target_entropy, self.opt.as_mut()) {
            let loss = {
                let tmp = (logp.detach() + target_entropy)?;
                (self.log_alpha.broadcast_mul(&tmp)? * -1f64)?.mean_all()?
            };
            opt.backward_step(&loss)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_alpha() -> Result<()> {
        let mut ent_coef = EntCoef::new(EntCoefMode::Fix(0.2), &Device::Cpu)?;
        let logp = Tensor::from_slice(&[-1f32, -2.0], (2,), &Device::Cpu)?;
        ent_coef.update(&logp)?;
        assert!((ent_coef.alpha()? - 0.2).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_auto_alpha_decreases_with_high_entropy() -> Result<()> {
        // Entropy -logp = 5 is above the target -1, so alpha should shrink.
        let mut ent_coef = EntCoef::new(EntCoefMode::Auto(-1.0, 1e-2), &Device::Cpu)?;
        let alpha0 = ent_coef.alpha()?;
        let logp = Tensor::from_slice(&[-5f32, -5.0, -5.0], (3,), &Device::Cpu)?;
        for _ in 0..10 {
            ent_coef.update(&logp)?;
        }
        assert!(ent_coef.alpha()? < alpha0);
        Ok(())
    }
}
