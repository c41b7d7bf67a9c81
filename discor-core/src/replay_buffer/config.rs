//! Configuration of [`ReplayBuffer`](super::ReplayBuffer).
use crate::error::BufferError;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayBuffer`](super::ReplayBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// The maximum number of transitions.
    pub capacity: usize,

    /// Shape of a single state.
    pub state_shape: Vec<usize>,

    /// Shape of a single action.
    pub action_shape: Vec<usize>,

    /// If `true`, each transition carries the log probability of its action.
    pub save_log_pi: bool,

    /// Seed of the random number generator used in sampling.
    pub seed: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            state_shape: vec![1],
            action_shape: vec![1],
            save_log_pi: false,
            seed: 42,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the shape of states.
    pub fn state_shape(mut self, v: Vec<usize>) -> Self {
        self.state_shape = v;
        self
    }

    /// Sets the shape of actions.
    pub fn action_shape(mut self, v: Vec<usize>) -> Self {
        self.action_shape = v;
        self
    }

    /// Stores log probabilities of actions.
    pub fn save_log_pi(mut self, v: bool) -> Self {
        self.save_log_pi = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that the buffer can hold at least one transition.
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.capacity == 0 {
            return Err(BufferError::InvalidCapacity);
        }
        Ok(())
    }

    /// Constructs [`ReplayBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of replay buffer from {:?}", path_);
        Ok(b)
    }

    /// Saves [`ReplayBufferConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of replay buffer into {:?}", path_);
        Ok(())
    }
}
