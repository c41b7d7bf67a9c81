//! DisCor: distribution correction for the critics of soft actor-critic.
//!
//! The critic loss of each transition is weighted by
//! `exp(-(1 - done) * gamma * delta(s', a') / tau)`, normalized over the batch,
//! where `delta` is the output of an error network trained to estimate the
//! accumulated bootstrap error of the critic and `tau` is a running average of
//! its mean output. Weights are uniform during the first `start_steps_is`
//! learning steps.
mod base;
mod batch;
mod config;
mod critic_update;
mod error_update;
mod importance;
mod target_sync;
mod tau;
pub use base::DisCor;
pub use batch::BatchTensors;
pub use config::{DisCorConfig, DisCorConfigError, EncoderSyncConfig};
pub use critic_update::{importance_weighted_loss, CriticUpdate, CriticUpdater};
pub use error_update::{ErrorUpdate, ErrorUpdater};
pub use importance::{sample_next_errors, ImportanceWeightCalculator, ImportanceWeights};
pub use target_sync::{SyncSchedule, TargetSynchronizer};
pub use tau::TauPair;
