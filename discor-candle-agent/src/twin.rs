//! Twin estimators with target networks.
//!
//! The same structure serves as the twin critic and as the twin error
//! network of DisCor: two independently parameterized networks evaluated on
//! the same `(state, action)` batch, each with a slowly tracking target copy.
mod base;
mod config;
pub use base::{TwinEstimator, TwinNet};
pub use config::TwinEstimatorConfig;
