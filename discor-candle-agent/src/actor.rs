//! Policy consumed by DisCor.
//!
//! DisCor only needs to draw actions and their log probabilities from the
//! current policy, with or without gradients, and to run the policy update of
//! the underlying actor-critic method. [`SacActor`] provides both for a
//! tanh-squashed Gaussian policy as in soft actor-critic.
mod base;
mod config;
mod ent_coef;
use crate::twin::TwinEstimator;
use anyhow::Result;
pub use base::SacActor;
use candle_core::Tensor;
pub use config::SacActorConfig;
use discor_core::record::Record;
pub use ent_coef::{EntCoef, EntCoefMode};

/// A stochastic policy with its own update rule.
pub trait StochasticPolicy {
    /// Samples actions for a batch of observations.
    ///
    /// Returns `(actions, log_probs)` with shapes `[batch_size, action_dim]`
    /// and `[batch_size]`. If `with_gradients` is `false`, both are detached.
    fn sample(&self, obs: &Tensor, with_gradients: bool) -> Result<(Tensor, Tensor)>;

    /// Entropy coefficient subtracted from bootstrapped values.
    fn alpha(&self) -> Result<f64>;

    /// Updates the policy against the given critic.
    fn update<C: TwinEstimator>(&mut self, obs: &Tensor, critic: &C) -> Result<Record>;
}
