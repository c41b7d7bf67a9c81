//! Batch of transitions on a device.
use crate::util::array_to_tensor;
use anyhow::Result;
use candle_core::{Device, Tensor};
use discor_core::TransitionBatch;

/// Tensors of a sampled batch used in a DisCor update.
///
/// `reward` and `not_done` have shape `[batch_size]`.
pub struct BatchTensors {
    /// States, `[batch_size, ..]`.
    pub obs: Tensor,

    /// Actions, `[batch_size, ..]`.
    pub act: Tensor,

    /// Rewards.
    pub reward: Tensor,

    /// Next states, `[batch_size, ..]`.
    pub next_obs: Tensor,

    /// `1 - done`.
    pub not_done: Tensor,
}

impl BatchTensors {
    /// Constructs [`BatchTensors`] from tensors already on a device.
    ///
    /// `done` holds flags as 0.0 or 1.0.
    pub fn new(obs: Tensor, act: Tensor, reward: Tensor, next_obs: Tensor, done: Tensor) -> Result<Self> {
        let not_done = (1f64 - &done)?;
        Ok(Self {
            obs,
            act,
            reward,
            next_obs,
            not_done,
        })
    }

    /// Copies a batch sampled from the replay buffer to `device`.
    pub fn from_batch(batch: &TransitionBatch, device: &Device) -> Result<Self> {
        Self::new(
            array_to_tensor(&batch.states, device)?,
            array_to_tensor(&batch.actions, device)?,
            array_to_tensor(&batch.rewards, device)?,
            array_to_tensor(&batch.next_states, device)?,
            array_to_tensor(&batch.dones, device)?,
        )
    }

    /// Number of transitions.
    pub fn batch_size(&self) -> usize {
        self.reward.dims()[0]
    }
}
