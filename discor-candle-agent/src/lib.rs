//! DisCor agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! DisCor trains twin critics with a loss reweighted per transition. The
//! weights come from a pair of error networks estimating the accumulated
//! bootstrap error of the critics, so transitions whose successor states carry
//! large estimated error have less influence on the critic update.
pub mod actor;
pub mod discor;
pub mod mlp;
pub mod model;
pub mod opt;
#[cfg(test)]
mod test_util;
pub mod twin;
pub mod util;
use serde::{Deserialize, Serialize};

/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Creates the corresponding [`candle_core::Device`].
    pub fn to_candle(self) -> candle_core::Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}
