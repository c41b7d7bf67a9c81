//! Configuration of [`SacActor`](super::SacActor).
use super::EntCoefMode;
use crate::opt::OptimizerConfig;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SacActor`](super::SacActor).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacActorConfig<P> {
    /// Configuration of the policy network.
    pub policy_config: Option<P>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,

    /// Lower bound of log standard deviation.
    pub min_log_std: f64,

    /// Upper bound of log standard deviation.
    pub max_log_std: f64,

    /// Small constant in the log Jacobian of tanh.
    pub epsilon: f64,

    /// How to handle the entropy coefficient.
    pub ent_coef_mode: EntCoefMode,
}

impl<P> Default for SacActorConfig<P> {
    fn default() -> Self {
        Self {
            policy_config: None,
            opt_config: OptimizerConfig::Adam { lr: 0.0003 },
            min_log_std: -20.0,
            max_log_std: 2.0,
            epsilon: 1e-6,
            ent_coef_mode: EntCoefMode::Fix(1.0),
        }
    }
}

impl<P> SacActorConfig<P>
where
    P: DeserializeOwned + Serialize,
{
    /// Sets configurations of the policy network.
    pub fn policy_config(mut self, v: P) -> Self {
        self.policy_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the minimum value of log std.
    pub fn min_log_std(mut self, v: f64) -> Self {
        self.min_log_std = v;
        self
    }

    /// Sets the maximum value of log std.
    pub fn max_log_std(mut self, v: f64) -> Self {
        self.max_log_std = v;
        self
    }

    /// Sets the entropy coefficient mode.
    pub fn ent_coef_mode(mut self, v: EntCoefMode) -> Self {
        self.ent_coef_mode = v;
        self
    }

    /// Constructs [`SacActorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacActorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
