//! Configuration of [`TwinNet`](super::TwinNet).
use crate::opt::OptimizerConfig;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TwinNet`](super::TwinNet).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TwinEstimatorConfig<Q> {
    /// Configuration of each of the twin networks.
    pub model_config: Option<Q>,

    /// Configuration of the optimizer shared by the twin networks.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for TwinEstimatorConfig<Q> {
    fn default() -> Self {
        Self {
            model_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> TwinEstimatorConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Sets configurations of the networks.
    pub fn model_config(mut self, v: Q) -> Self {
        self.model_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`TwinEstimatorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TwinEstimatorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
