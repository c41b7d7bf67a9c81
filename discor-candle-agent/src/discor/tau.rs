//! Temperatures of the importance weights.

/// Temperatures of the two error networks.
///
/// Each temperature is an exponential moving average of the mean error
/// estimate of its network over the sampled batches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TauPair {
    /// Temperature of the first error network.
    pub tau1: f64,

    /// Temperature of the second error network.
    pub tau2: f64,
}

impl TauPair {
    /// Both temperatures start at `tau_init`.
    pub fn new(tau_init: f64) -> Self {
        Self {
            tau1: tau_init,
            tau2: tau_init,
        }
    }

    /// `tau <- (1 - coef) * tau + coef * mean_error`, for each network.
    pub fn update(&mut self, coef: f64, mean_errors: (f64, f64)) {
        self.tau1 = (1.0 - coef) * self.tau1 + coef * mean_errors.0;
        self.tau2 = (1.0 - coef) * self.tau2 + coef * mean_errors.1;
    }
}
