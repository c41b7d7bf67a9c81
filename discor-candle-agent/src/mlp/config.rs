use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp) and [`Mlp2`](super::Mlp2).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation_out: bool,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `activation_out` - If `true`, ReLU is applied to the output of [`Mlp`](super::Mlp),
    ///   which keeps the estimates of an error network non-negative.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, activation_out: bool) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out,
        }
    }

    pub(super) fn dims(&self) -> Vec<usize> {
        let mut dims = vec![self.in_dim];
        dims.extend(self.units.iter().copied());
        dims.push(self.out_dim);
        dims
    }
}
