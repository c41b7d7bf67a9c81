//! DisCor agent.
use super::{
    BatchTensors, CriticUpdater, DisCorConfig, ErrorUpdater, ImportanceWeightCalculator, SyncSchedule,
    TargetSynchronizer, TauPair,
};
use crate::{
    actor::StochasticPolicy,
    model::SubModel2,
    twin::{TwinEstimator, TwinNet},
};
use anyhow::Result;
use candle_core::Device;
use discor_core::{
    record::{Record, RecordValue},
    ReplayBuffer,
};
use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// DisCor on top of soft actor-critic.
///
/// `C` is the twin critic, `E` the twin error network and `P` the policy.
/// Each call of [`DisCor::update`] runs one learning step: the critics are
/// trained with importance weights, then the error networks, the policy and
/// the target networks on their own intervals.
pub struct DisCor<C, E, P> {
    critic: C,
    error: E,
    policy: P,
    taus: TauPair,
    weights: ImportanceWeightCalculator,
    critic_updater: CriticUpdater,
    error_updater: ErrorUpdater,
    target_sync: TargetSynchronizer,
    batch_size: usize,
    update_freq_actor: usize,
    update_freq_error: usize,
    learning_steps: usize,
    device: Device,
}

impl<Q, EQ, P> DisCor<TwinNet<Q>, TwinNet<EQ>, P>
where
    Q: SubModel2,
    EQ: SubModel2,
    Q::Config: DeserializeOwned + Serialize + Debug + Clone,
    EQ::Config: DeserializeOwned + Serialize + Debug + Clone,
    P: StochasticPolicy,
{
    /// Constructs [`DisCor`] with critics and error networks built from `config`.
    ///
    /// The policy must live on the device given in `config`.
    pub fn build(config: DisCorConfig<Q::Config, EQ::Config>, policy: P) -> Result<Self> {
        config.validate()?;
        let device = config.device.unwrap_or_default().to_candle()?;
        let critic = TwinNet::build(config.critic_config.clone(), "critic", &device)?;
        let error = TwinNet::build(config.error_config.clone(), "error", &device)?;
        Self::from_parts(&config, critic, error, policy, device)
    }
}

impl<C, E, P> DisCor<C, E, P>
where
    C: TwinEstimator,
    E: TwinEstimator,
    P: StochasticPolicy,
{
    /// Constructs [`DisCor`] from already built components.
    ///
    /// Model and optimizer configurations in `config` are not used.
    pub fn from_parts<QC, EC>(
        config: &DisCorConfig<QC, EC>,
        critic: C,
        error: E,
        policy: P,
        device: Device,
    ) -> Result<Self>
    where
        QC: DeserializeOwned + Serialize + Debug,
        EC: DeserializeOwned + Serialize + Debug,
    {
        config.validate()?;
        let schedule = SyncSchedule::new(config.target_update_coef, config.update_freq_target);
        let target_sync = match &config.encoder_sync {
            None => TargetSynchronizer::new(schedule.clone(), schedule),
            Some(encoder) => TargetSynchronizer::with_encoder(
                schedule.clone(),
                schedule,
                SyncSchedule::new(encoder.target_update_coef, config.update_freq_target),
                &encoder.key,
            ),
        };

        Ok(Self {
            critic,
            error,
            policy,
            taus: TauPair::new(config.tau_init),
            weights: ImportanceWeightCalculator::new(config.gamma, config.start_steps_is),
            critic_updater: CriticUpdater::new(config.gamma),
            error_updater: ErrorUpdater::new(config.gamma, config.target_update_coef),
            target_sync,
            batch_size: config.batch_size,
            update_freq_actor: config.update_freq_actor,
            update_freq_error: config.update_freq_error,
            learning_steps: 0,
            device,
        })
    }

    /// Samples a batch from `buffer` and runs one learning step.
    pub fn update(&mut self, buffer: &mut ReplayBuffer) -> Result<Record> {
        trace!("ReplayBuffer::sample()");
        let batch = buffer.sample(self.batch_size)?;
        let batch = BatchTensors::from_batch(&batch, &self.device)?;
        self.update_with_batch(&batch)
    }

    /// Runs one learning step on the given batch.
    pub fn update_with_batch(&mut self, batch: &BatchTensors) -> Result<Record> {
        self.learning_steps += 1;
        let step = self.learning_steps;
        let is_active = self.weights.is_active(step);
        if self.weights.starts_at(step) {
            debug!("Importance sampling starts at learning step {}", step);
        }

        trace!("ImportanceWeightCalculator::calculate()");
        let weights = self
            .weights
            .calculate(step, &self.policy, &self.error, batch, &self.taus)?;

        trace!("CriticUpdater::update()");
        let critic = self
            .critic_updater
            .update(&mut self.critic, &self.policy, batch, &weights)?;
        let mut record = Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(critic.loss1 + critic.loss2)),
            ("loss_critic1", RecordValue::Scalar(critic.loss1)),
            ("loss_critic2", RecordValue::Scalar(critic.loss2)),
        ]);

        if step % self.update_freq_error == 0 {
            trace!("ErrorUpdater::update()");
            let error = self.error_updater.update(
                &mut self.error,
                &self.policy,
                batch,
                (&critic.td_errors1, &critic.td_errors2),
                &mut self.taus,
            )?;
            record.insert("loss_error", RecordValue::Scalar(error.loss1 + error.loss2));
            record.insert("mean_error1", RecordValue::Scalar(error.mean_errors.0));
            record.insert("mean_error2", RecordValue::Scalar(error.mean_errors.1));
        }

        if step % self.update_freq_actor == 0 {
            trace!("StochasticPolicy::update()");
            record.merge_inplace(self.policy.update(&batch.obs, &self.critic)?);
        }

        trace!("TargetSynchronizer::sync()");
        self.target_sync.sync(step, &mut self.critic, &mut self.error)?;

        record.insert("tau1", RecordValue::Scalar(self.taus.tau1 as f32));
        record.insert("tau2", RecordValue::Scalar(self.taus.tau2 as f32));
        record.insert("learning_steps", RecordValue::Scalar(step as f32));
        record.insert("is_active", RecordValue::Scalar(if is_active { 1.0 } else { 0.0 }));
        Ok(record)
    }

    /// Current temperatures.
    pub fn taus(&self) -> TauPair {
        self.taus
    }

    /// Number of learning steps taken so far.
    pub fn learning_steps(&self) -> usize {
        self.learning_steps
    }

    /// Twin critics.
    pub fn critic(&self) -> &C {
        &self.critic
    }

    /// Twin error networks.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}
