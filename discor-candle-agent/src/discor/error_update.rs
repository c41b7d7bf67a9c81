//! Update of the error networks and their temperatures.
use super::{sample_next_errors, BatchTensors, TauPair};
use crate::{actor::StochasticPolicy, twin::TwinEstimator};
use anyhow::Result;
use candle_core::Tensor;

/// Result of an error network update.
pub struct ErrorUpdate {
    /// Loss of the first error network.
    pub loss1: f32,

    /// Loss of the second error network.
    pub loss2: f32,

    /// Batch mean of the current error estimates, for each network.
    pub mean_errors: (f32, f32),
}

/// Regresses the error networks toward the bootstrapped accumulated error.
pub struct ErrorUpdater {
    gamma: f64,
    tau_coef: f64,
}

impl ErrorUpdater {
    /// `tau_coef` is the blend coefficient of the temperatures.
    pub fn new(gamma: f64, tau_coef: f64) -> Self {
        Self { gamma, tau_coef }
    }

    /// `|td| + gamma * not_done * next_errors`, detached.
    pub fn target_errors(&self, td_errors: &Tensor, next_errors: &Tensor, not_done: &Tensor) -> Result<Tensor> {
        let bootstrap = (not_done * next_errors)?.affine(self.gamma, 0.0)?;
        Ok((td_errors.abs()? + bootstrap)?.detach())
    }

    /// Takes one optimization step on the error networks, then moves the
    /// temperatures toward the mean error estimates.
    pub fn update<E, P>(
        &self,
        error: &mut E,
        policy: &P,
        batch: &BatchTensors,
        td_errors: (&Tensor, &Tensor),
        taus: &mut TauPair,
    ) -> Result<ErrorUpdate>
    where
        E: TwinEstimator,
        P: StochasticPolicy,
    {
        let (curr1, curr2) = error.forward(&batch.obs, &batch.act, true)?;
        let (next1, next2) = sample_next_errors(policy, &*error, &batch.next_obs)?;
        let tgt1 = self.target_errors(td_errors.0, &next1, &batch.not_done)?;
        let tgt2 = self.target_errors(td_errors.1, &next2, &batch.not_done)?;

        let loss1 = (&curr1 - &tgt1)?.sqr()?.mean_all()?;
        let loss2 = (&curr2 - &tgt2)?.sqr()?.mean_all()?;
        error.backward_step(&(&loss1 + &loss2)?)?;

        let mean_errors = (
            curr1.detach().mean_all()?.to_scalar::<f32>()?,
            curr2.detach().mean_all()?.to_scalar::<f32>()?,
        );
        taus.update(self.tau_coef, (mean_errors.0 as f64, mean_errors.1 as f64));

        Ok(ErrorUpdate {
            loss1: loss1.to_scalar::<f32>()?,
            loss2: loss2.to_scalar::<f32>()?,
            mean_errors,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::{filled, FixedPolicy, FixedTwin};
    use candle_core::Device;

    fn t(v: &[f32]) -> Result<Tensor> {
        Ok(Tensor::from_slice(v, (v.len(),), &Device::Cpu)?)
    }

    #[test]
    fn test_update() -> Result<()> {
        let mut error = FixedTwin::new((vec![1.0, 2.0], vec![3.0, 4.0]), (vec![2.0, 2.0], vec![0.0, 0.0]));
        let policy = FixedPolicy::new(1, 0.0, 1.0);
        let batch = BatchTensors::new(
            filled(2, 2, 0.0)?,
            filled(2, 1, 0.0)?,
            t(&[0.0, 0.0])?,
            filled(2, 2, 0.0)?,
            t(&[0.0, 1.0])?,
        )?;
        let mut taus = TauPair::new(10.0);
        let updater = ErrorUpdater::new(0.5, 0.1);
        let out = updater.update(
            &mut error,
            &policy,
            &batch,
            (&t(&[-1.0, 1.0])?, &t(&[0.5, -0.5])?),
            &mut taus,
        )?;

        // Targets are [2, 1] and [0.5, 0.5].
        assert!((out.loss1 - 1.0).abs() < 1e-6);
        assert!((out.loss2 - 9.25).abs() < 1e-6);
        assert!((error.losses[0] - 10.25).abs() < 1e-6);
        assert_eq!(out.mean_errors, (1.5, 3.5));
        assert!((taus.tau1 - 9.15).abs() < 1e-6);
        assert!((taus.tau2 - 9.35).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_target_errors_are_non_negative() -> Result<()> {
        let updater = ErrorUpdater::new(0.99, 5e-3);
        let tgt = updater.target_errors(&t(&[-3.0, 0.0, 2.0])?, &t(&[1.0, 1.0, 1.0])?, &t(&[1.0, 0.0, 1.0])?)?;
        let tgt = tgt.to_vec1::<f32>()?;
        assert!((tgt[0] - 3.99).abs() < 1e-6);
        assert_eq!(tgt[1], 0.0);
        assert!((tgt[2] - 2.99).abs() < 1e-6);
        Ok(())
    }
}
