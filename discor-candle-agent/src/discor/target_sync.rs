//! Soft updates of target networks on a schedule.
use crate::{twin::TwinEstimator, util::ParamScope};
use anyhow::Result;
use log::trace;

/// Blend coefficient and interval of a soft update.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSchedule {
    /// `target = (1 - coef) * target + coef * online`.
    pub coef: f64,

    /// Interval in learning steps.
    pub interval: usize,
}

impl SyncSchedule {
    /// Constructs [`SyncSchedule`].
    pub fn new(coef: f64, interval: usize) -> Self {
        Self { coef, interval }
    }

    /// Returns `true` if the update runs at `step`.
    pub fn is_due(&self, step: usize) -> bool {
        step % self.interval == 0
    }
}

/// Soft updates of the critic and error targets.
pub struct TargetSynchronizer {
    critic: Vec<(SyncSchedule, ParamScope)>,
    error: Vec<(SyncSchedule, ParamScope)>,
}

impl TargetSynchronizer {
    /// Every variable of each network follows one schedule.
    pub fn new(critic: SyncSchedule, error: SyncSchedule) -> Self {
        Self {
            critic: vec![(critic, ParamScope::All)],
            error: vec![(error, ParamScope::All)],
        }
    }

    /// Critic variables whose names contain `key` follow `encoder`, the
    /// rest of the critic follows `critic`.
    pub fn with_encoder(critic: SyncSchedule, error: SyncSchedule, encoder: SyncSchedule, key: &str) -> Self {
        Self {
            critic: vec![
                (critic, ParamScope::Excluding(key.to_string())),
                (encoder, ParamScope::Matching(key.to_string())),
            ],
            error: vec![(error, ParamScope::All)],
        }
    }

    /// Runs the soft updates due at `step`. Returns `true` if any ran.
    pub fn sync<C, E>(&self, step: usize, critic: &mut C, error: &mut E) -> Result<bool>
    where
        C: TwinEstimator,
        E: TwinEstimator,
    {
        let mut synced = false;
        for (schedule, scope) in self.critic.iter().filter(|(s, _)| s.is_due(step)) {
            trace!("Sync critic target, coef = {}, scope = {:?}", schedule.coef, scope);
            critic.sync_target(schedule.coef, scope)?;
            synced = true;
        }
        for (schedule, scope) in self.error.iter().filter(|(s, _)| s.is_due(step)) {
            trace!("Sync error target, coef = {}, scope = {:?}", schedule.coef, scope);
            error.sync_target(schedule.coef, scope)?;
            synced = true;
        }
        Ok(synced)
    }
}
