//! Configuration of [`DisCor`](super::DisCor).
use crate::{twin::TwinEstimatorConfig, Device};
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use thiserror::Error;

/// Invalid values in [`DisCorConfig`].
#[derive(Error, Debug, PartialEq)]
pub enum DisCorConfigError {
    /// The initial temperature must be strictly positive.
    #[error("tau_init must be positive, got {0}")]
    NonPositiveTau(f64),

    /// The discount factor must be in `[0, 1]`.
    #[error("gamma must be in [0, 1], got {0}")]
    InvalidGamma(f64),

    /// Blend coefficients must be in `(0, 1]`.
    #[error("{name} must be in (0, 1], got {value}")]
    InvalidCoef {
        /// Name of the field.
        name: &'static str,
        /// Given value.
        value: f64,
    },

    /// Batch size and update intervals must be positive.
    #[error("{0} must be positive")]
    Zero(&'static str),
}

/// Target synchronization of a shared state encoder.
///
/// Critic variables whose names contain `key` are blended with
/// `target_update_coef` instead of the coefficient of the rest of the critic.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EncoderSyncConfig {
    /// Substring identifying encoder variables.
    pub key: String,

    /// Blend coefficient of the encoder target.
    pub target_update_coef: f64,
}

/// Configuration of [`DisCor`](super::DisCor).
///
/// `Q` and `E` are the configurations of the critic and the error networks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DisCorConfig<Q, E> {
    /// Configuration of the twin critics.
    pub critic_config: TwinEstimatorConfig<Q>,

    /// Configuration of the twin error networks.
    pub error_config: TwinEstimatorConfig<E>,

    /// Discount factor.
    pub gamma: f64,

    /// Batch size for training.
    pub batch_size: usize,

    /// Blend coefficient of target networks and of the temperatures.
    pub target_update_coef: f64,

    /// Initial value of both temperatures.
    pub tau_init: f64,

    /// Number of updates with uniform weights before importance sampling starts.
    pub start_steps_is: usize,

    /// Interval of actor updates in learning steps.
    pub update_freq_actor: usize,

    /// Interval of error network updates in learning steps.
    pub update_freq_error: usize,

    /// Interval of target synchronization in learning steps.
    pub update_freq_target: usize,

    /// Separate synchronization of a shared encoder, if any.
    pub encoder_sync: Option<EncoderSyncConfig>,

    /// Device for the networks.
    pub device: Option<Device>,
}

impl<Q, E> Default for DisCorConfig<Q, E> {
    fn default() -> Self {
        Self {
            critic_config: Default::default(),
            error_config: Default::default(),
            gamma: 0.99,
            batch_size: 256,
            target_update_coef: 5e-3,
            tau_init: 10.0,
            start_steps_is: 10_000,
            update_freq_actor: 1,
            update_freq_error: 1,
            update_freq_target: 1,
            encoder_sync: None,
            device: None,
        }
    }
}

fn check_coef(name: &'static str, value: f64) -> Result<(), DisCorConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(DisCorConfigError::InvalidCoef { name, value })
    }
}

impl<Q, E> DisCorConfig<Q, E>
where
    Q: DeserializeOwned + Serialize + Debug,
    E: DeserializeOwned + Serialize + Debug,
{
    /// Configuration of the critics.
    pub fn critic_config(mut self, v: TwinEstimatorConfig<Q>) -> Self {
        self.critic_config = v;
        self
    }

    /// Configuration of the error networks.
    pub fn error_config(mut self, v: TwinEstimatorConfig<E>) -> Self {
        self.error_config = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Blend coefficient of targets and temperatures.
    pub fn target_update_coef(mut self, v: f64) -> Self {
        self.target_update_coef = v;
        self
    }

    /// Initial temperature.
    pub fn tau_init(mut self, v: f64) -> Self {
        self.tau_init = v;
        self
    }

    /// Warm-up period of importance sampling in learning steps.
    pub fn start_steps_is(mut self, v: usize) -> Self {
        self.start_steps_is = v;
        self
    }

    /// Intervals of actor, error network and target updates.
    pub fn update_freqs(mut self, actor: usize, error: usize, target: usize) -> Self {
        self.update_freq_actor = actor;
        self.update_freq_error = error;
        self.update_freq_target = target;
        self
    }

    /// Tracks encoder variables, identified by `key`, with their own coefficient.
    pub fn encoder_sync(mut self, key: impl Into<String>, target_update_coef: f64) -> Self {
        self.encoder_sync = Some(EncoderSyncConfig {
            key: key.into(),
            target_update_coef,
        });
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), DisCorConfigError> {
        if !(self.tau_init > 0.0) {
            return Err(DisCorConfigError::NonPositiveTau(self.tau_init));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DisCorConfigError::InvalidGamma(self.gamma));
        }
        check_coef("target_update_coef", self.target_update_coef)?;
        if let Some(encoder_sync) = &self.encoder_sync {
            check_coef("encoder_sync.target_update_coef", encoder_sync.target_update_coef)?;
        }
        for (name, v) in [
            ("batch_size", self.batch_size),
            ("update_freq_actor", self.update_freq_actor),
            ("update_freq_error", self.update_freq_error),
            ("update_freq_target", self.update_freq_target),
        ] {
            if v == 0 {
                return Err(DisCorConfigError::Zero(name));
            }
        }
        Ok(())
    }

    /// Constructs [`DisCorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DisCor agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DisCorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DisCor agent into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{opt::OptimizerConfig, test_util::LinearConfig};
    use tempdir::TempDir;

    type Config = DisCorConfig<LinearConfig, LinearConfig>;

    #[test]
    fn test_serde_discor_config() -> Result<()> {
        let config = Config::default()
            .critic_config(TwinEstimatorConfig::default().model_config(LinearConfig::new(3, 1)))
            .error_config(
                TwinEstimatorConfig::default()
                    .model_config(LinearConfig::new(3, 1))
                    .opt_config(OptimizerConfig::Adam { lr: 1e-3 }),
            )
            .batch_size(64)
            .update_freqs(2, 2, 2)
            .encoder_sync("encoder", 0.05)
            .device(Device::Cpu);

        let dir = TempDir::new("discor_config")?;
        let path = dir.path().join("discor.yaml");
        config.save(&path)?;
        let config_ = Config::load(&path)?;

        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert_eq!(Config::default().validate(), Ok(()));
        assert_eq!(
            Config::default().tau_init(0.0).validate(),
            Err(DisCorConfigError::NonPositiveTau(0.0))
        );
        assert_eq!(
            Config::default().discount_factor(1.5).validate(),
            Err(DisCorConfigError::InvalidGamma(1.5))
        );
        assert!(matches!(
            Config::default().target_update_coef(0.0).validate(),
            Err(DisCorConfigError::InvalidCoef { .. })
        ));
        assert!(matches!(
            Config::default().encoder_sync("encoder", 1.5).validate(),
            Err(DisCorConfigError::InvalidCoef {
                name: "encoder_sync.target_update_coef",
                ..
            })
        ));
        assert_eq!(
            Config::default().update_freqs(1, 0, 1).validate(),
            Err(DisCorConfigError::Zero("update_freq_error"))
        );
    }
}
