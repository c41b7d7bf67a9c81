//! Values reported by optimization steps.
//!
//! ```rust
//! use discor_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss_critic", 0.5);
//! record.insert("tau1", RecordValue::Scalar(9.9));
//! assert_eq!(record.get_scalar("tau1").unwrap(), 9.9);
//! ```
mod base;
pub use base::{Record, RecordValue};
