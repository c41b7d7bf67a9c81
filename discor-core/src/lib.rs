#![warn(missing_docs)]
//! Backend independent parts of the DisCor update core.
//!
//! This crate provides the circular [`ReplayBuffer`] from which the learner
//! draws transitions, the error types raised by the buffer and
//! [`Record`](record::Record), a container of values reported by each
//! optimization step.
pub mod error;
pub mod record;
pub mod replay_buffer;

pub use replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition, TransitionBatch};
