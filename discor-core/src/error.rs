//! Errors in the library.
use thiserror::Error;

/// Errors raised by [`ReplayBuffer`](crate::ReplayBuffer).
///
/// All of them indicate a bug on the caller side and are not meant to be retried.
#[derive(Error, Debug, PartialEq)]
pub enum BufferError {
    /// The buffer cannot hold a single transition.
    #[error("Capacity of a replay buffer must be positive")]
    InvalidCapacity,

    /// The shape of a state or an action differs from the configured one.
    #[error("Invalid shape of {name}: expected {expected:?}, got {actual:?}")]
    InvalidShape {
        /// `"state"` or `"action"`.
        name: &'static str,
        /// Configured shape.
        expected: Vec<usize>,
        /// Shape of the given array.
        actual: Vec<usize>,
    },

    /// A batch was requested before any transition was appended.
    #[error("Sampling from an empty replay buffer")]
    EmptyBuffer,

    /// A transition was appended before the buffer was reset with an initial state.
    #[error("Replay buffer must be reset with an initial state before append")]
    NotReset,

    /// A log probability was given to a buffer not storing them, or vice versa.
    #[error("Log probability mismatch: buffer stores log_pi = {expected}")]
    LogPiMismatch {
        /// Whether the buffer stores log probabilities.
        expected: bool,
    },
}

/// Errors on accessing values in a [`Record`](crate::record::Record).
#[derive(Error, Debug)]
pub enum RecordError {
    /// No value for the key.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}
