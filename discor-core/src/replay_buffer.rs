//! Fixed-capacity circular replay buffer.
//!
//! The buffer stores `(state, action, reward, done, next_state[, log_pi])`
//! transitions in parallel arrays indexed by a logical slot. Appending to a
//! full buffer overwrites the oldest slot, and batches are drawn by independent
//! uniform sampling of slot indices, with replacement.
//!
//! ```rust
//! use discor_core::{ReplayBuffer, ReplayBufferConfig};
//! use ndarray::array;
//!
//! let config = ReplayBufferConfig::default()
//!     .capacity(4)
//!     .state_shape(vec![1])
//!     .action_shape(vec![1]);
//! let mut buffer = ReplayBuffer::build(&config).unwrap();
//!
//! buffer.reset(&array![0f32]).unwrap();
//! buffer.append(&array![1f32], &array![0.1f32], 1.0, false, None).unwrap();
//!
//! let batch = buffer.sample(8).unwrap();
//! assert_eq!(batch.len(), 8);
//! ```
mod base;
mod batch;
mod config;
pub use base::ReplayBuffer;
pub use batch::{Transition, TransitionBatch};
pub use config::ReplayBufferConfig;
