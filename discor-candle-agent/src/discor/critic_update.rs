//! Importance-weighted update of the twin critics.
use super::{BatchTensors, ImportanceWeights};
use crate::{actor::StochasticPolicy, twin::TwinEstimator};
use anyhow::Result;
use candle_core::Tensor;

/// Result of a critic update.
pub struct CriticUpdate {
    /// Detached TD errors of the first critic, `[batch_size]`.
    pub td_errors1: Tensor,

    /// Detached TD errors of the second critic, `[batch_size]`.
    pub td_errors2: Tensor,

    /// Weighted loss of the first critic.
    pub loss1: f32,

    /// Weighted loss of the second critic.
    pub loss2: f32,
}

/// `sum(td^2 * w)`.
pub fn importance_weighted_loss(td_errors: &Tensor, weights: &Tensor) -> Result<Tensor> {
    Ok((td_errors.sqr()? * weights)?.sum_all()?)
}

/// Updates the critics of soft actor-critic with per-transition weights.
pub struct CriticUpdater {
    gamma: f64,
}

impl CriticUpdater {
    /// Constructs [`CriticUpdater`].
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Soft bootstrapped targets,
    /// `r + (1 - done) * gamma * (min(q1_tgt, q2_tgt)(s', a') - alpha * log_pi(a' | s'))`.
    pub fn targets<C, P>(&self, critic: &C, policy: &P, batch: &BatchTensors) -> Result<Tensor>
    where
        C: TwinEstimator,
        P: StochasticPolicy,
    {
        let (next_act, next_log_p) = policy.sample(&batch.next_obs, false)?;
        let (q1_tgt, q2_tgt) = critic.forward_tgt(&batch.next_obs, &next_act)?;
        let next_v = (q1_tgt.minimum(&q2_tgt)? - (next_log_p * policy.alpha()?)?)?;
        let bootstrap = (&batch.not_done * next_v)?.affine(self.gamma, 0.0)?;
        Ok((&batch.reward + bootstrap)?.detach())
    }

    /// TD errors `q_k(s, a) - target` of both critics, with gradients.
    pub fn td_errors<C, P>(&self, critic: &C, policy: &P, batch: &BatchTensors) -> Result<(Tensor, Tensor)>
    where
        C: TwinEstimator,
        P: StochasticPolicy,
    {
        let (q1, q2) = critic.forward(&batch.obs, &batch.act, true)?;
        let tgt = self.targets(critic, policy, batch)?;
        Ok(((q1 - &tgt)?, (q2 - &tgt)?))
    }

    /// Takes one optimization step on `loss1 + loss2`.
    pub fn update<C, P>(
        &self,
        critic: &mut C,
        policy: &P,
        batch: &BatchTensors,
        weights: &ImportanceWeights,
    ) -> Result<CriticUpdate>
    where
        C: TwinEstimator,
        P: StochasticPolicy,
    {
        let (td1, td2) = self.td_errors(critic, policy, batch)?;
        let loss1 = importance_weighted_loss(&td1, &weights.w1)?;
        let loss2 = importance_weighted_loss(&td2, &weights.w2)?;
        critic.backward_step(&(&loss1 + &loss2)?)?;

        Ok(CriticUpdate {
            td_errors1: td1.detach(),
            td_errors2: td2.detach(),
            loss1: loss1.to_scalar::<f32>()?,
            loss2: loss2.to_scalar::<f32>()?,
        })
    }
}
