//! Importance weights of transitions in the critic loss.
use super::{BatchTensors, TauPair};
use crate::{actor::StochasticPolicy, twin::TwinEstimator};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use log::trace;

/// Per-transition weights of the twin critic losses, each `[batch_size]`.
pub struct ImportanceWeights {
    /// Weights of the first critic.
    pub w1: Tensor,

    /// Weights of the second critic.
    pub w2: Tensor,
}

impl ImportanceWeights {
    /// `1 / batch_size` for every transition.
    pub fn uniform(batch_size: usize, device: &Device) -> Result<Self> {
        let w = Tensor::ones(batch_size, DType::F32, device)?.affine(1.0 / batch_size as f64, 0.0)?;
        Ok(Self { w1: w.clone(), w2: w })
    }
}

/// Estimated errors of the target error networks at `(next_obs, a')`, with
/// `a'` drawn from the current policy. No gradients flow.
pub fn sample_next_errors<P, E>(policy: &P, error: &E, next_obs: &Tensor) -> Result<(Tensor, Tensor)>
where
    P: StochasticPolicy,
    E: TwinEstimator,
{
    let (next_act, _) = policy.sample(next_obs, false)?;
    error.forward_tgt(next_obs, &next_act)
}

/// Computes self-normalized importance weights from the error networks.
///
/// The weight of a transition is proportional to
/// `exp(-(1 - done) * gamma * next_error / tau)`, normalized over the batch.
pub struct ImportanceWeightCalculator {
    gamma: f64,
    start_steps_is: usize,
}

impl ImportanceWeightCalculator {
    /// Constructs [`ImportanceWeightCalculator`].
    pub fn new(gamma: f64, start_steps_is: usize) -> Self {
        Self {
            gamma,
            start_steps_is,
        }
    }

    /// Returns `true` if `learning_steps` is the first step, counted from 1,
    /// with importance sampling.
    pub fn starts_at(&self, learning_steps: usize) -> bool {
        learning_steps == self.start_steps_is.max(1)
    }

    /// Returns `true` if importance sampling is used at `learning_steps`.
    pub fn is_active(&self, learning_steps: usize) -> bool {
        learning_steps >= self.start_steps_is
    }

    /// Softmax over the batch of `-not_done * gamma * next_errors / tau`.
    pub fn weights_from_errors(
        &self,
        next_errors: (&Tensor, &Tensor),
        not_done: &Tensor,
        taus: &TauPair,
    ) -> Result<ImportanceWeights> {
        let weights = |next_errors: &Tensor, tau: f64| -> Result<Tensor> {
            let x = (not_done * next_errors)?.affine(-self.gamma / tau, 0.0)?;
            Ok(candle_nn::ops::softmax(&x, 0)?)
        };
        Ok(ImportanceWeights {
            w1: weights(next_errors.0, taus.tau1)?,
            w2: weights(next_errors.1, taus.tau2)?,
        })
    }

    /// Weights for the batch at `learning_steps`.
    pub fn calculate<P, E>(
        &self,
        learning_steps: usize,
        policy: &P,
        error: &E,
        batch: &BatchTensors,
        taus: &TauPair,
    ) -> Result<ImportanceWeights>
    where
        P: StochasticPolicy,
        E: TwinEstimator,
    {
        if !self.is_active(learning_steps) {
            return ImportanceWeights::uniform(batch.batch_size(), batch.reward.device());
        }
        trace!("sample_next_errors()");
        let (e1, e2) = sample_next_errors(policy, error, &batch.next_obs)?;
        self.weights_from_errors((&e1, &e2), &batch.not_done, taus)
    }
}
