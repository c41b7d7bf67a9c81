//! Tanh-squashed Gaussian policy.
use super::{EntCoef, SacActorConfig, StochasticPolicy};
use crate::{model::SubModel1, opt::Optimizer, twin::TwinEstimator};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use discor_core::record::{Record, RecordValue};
use log::trace;

/// Log density of the standard normal, summed over the last axis.
fn normal_logp(z: &Tensor) -> Result<Tensor> {
    let c = -0.5 * (2.0 * std::f64::consts::PI).ln();
    Ok(z.sqr()?.affine(-0.5, c)?.sum(D::Minus1)?)
}

/// Stochastic policy of soft actor-critic.
///
/// The network outputs the mean and log standard deviation of a Gaussian,
/// whose samples are squashed into `(-1, 1)` by tanh.
pub struct SacActor<P>
where
    P: SubModel1<Output = (Tensor, Tensor)>,
{
    _varmap: VarMap,
    policy: P,
    opt: Optimizer,
    ent_coef: EntCoef,
    min_log_std: f64,
    max_log_std: f64,
    epsilon: f64,
}

impl<P> SacActor<P>
where
    P: SubModel1<Output = (Tensor, Tensor)>,
{
    /// Constructs [`SacActor`].
    pub fn build(config: SacActorConfig<P::Config>, device: &Device) -> Result<Self> {
        let policy_config = config.policy_config.context("policy_config is not set.")?;
        let varmap = VarMap::new();
        let policy = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device).set_prefix("actor");
            P::build(vb, policy_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;
        let ent_coef = EntCoef::new(config.ent_coef_mode, device)?;

        Ok(Self {
            _varmap: varmap,
            policy,
            opt,
            ent_coef,
            min_log_std: config.min_log_std,
            max_log_std: config.max_log_std,
            epsilon: config.epsilon,
        })
    }
}

impl<P> StochasticPolicy for SacActor<P>
where
    P: SubModel1<Output = (Tensor, Tensor)>,
{
    fn sample(&self, obs: &Tensor, with_gradients: bool) -> Result<(Tensor, Tensor)> {
        let (mean, lstd) = self.policy.forward(obs)?;
        let lstd = lstd.clamp(self.min_log_std, self.max_log_std)?;
        let z = Tensor::randn(0f32, 1f32, mean.dims(), mean.device())?;
        let act = ((lstd.exp()? * &z)? + &mean)?.tanh()?;

        // Change of variables through the affine map and tanh.
        let log_p = {
            let log_jacobian = ((1f64 - act.sqr()?)? + self.epsilon)?
                .log()?
                .sum(D::Minus1)?;
            ((normal_logp(&z)? - lstd.sum(D::Minus1)?)? - log_jacobian)?
        };

        match with_gradients {
            true => Ok((act, log_p)),
            false => Ok((act.detach(), log_p.detach())),
        }
    }

    fn alpha(&self) -> Result<f64> {
        self.ent_coef.alpha()
    }

    fn update<C: TwinEstimator>(&mut self, obs: &Tensor, critic: &C) -> Result<Record> {
        trace!("SacActor::update()");
        let (act, log_p) = self.sample(obs, true)?;
        self.ent_coef.update(&log_p)?;

        let alpha = self.ent_coef.alpha()?;
        let loss = {
            let (q1, q2) = critic.forward(obs, &act, true)?;
            ((log_p * alpha)? - q1.minimum(&q2)?)?.mean_all()?
        };
        self.opt.backward_step(&loss)?;

        Ok(Record::from_slice(&[
            ("loss_actor", RecordValue::Scalar(loss.to_scalar::<f32>()?)),
            ("ent_coef", RecordValue::Scalar(alpha as f32)),
        ]))
    }
}
