//! Transitions taken out of the replay buffer.
use ndarray::{Array1, ArrayD};

/// A single transition, copied out of a slot of the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// `s_t`.
    pub state: ArrayD<f32>,

    /// `a_t`.
    pub action: ArrayD<f32>,

    /// `r_t`.
    pub reward: f32,

    /// 1.0 if the episode terminated at this transition, 0.0 otherwise.
    pub done: f32,

    /// `s_t+1`.
    pub next_state: ArrayD<f32>,

    /// `log pi(a_t | s_t)`, if the buffer stores it.
    pub log_pi: Option<f32>,
}

/// A batch of transitions sampled from [`ReplayBuffer`](super::ReplayBuffer).
///
/// The first axis of every array is the batch axis.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// States, `[batch_size, *state_shape]`.
    pub states: ArrayD<f32>,

    /// Actions, `[batch_size, *action_shape]`.
    pub actions: ArrayD<f32>,

    /// Rewards, `[batch_size]`.
    pub rewards: Array1<f32>,

    /// Next states, `[batch_size, *state_shape]`.
    pub next_states: ArrayD<f32>,

    /// Done flags as 0.0 or 1.0, `[batch_size]`.
    pub dones: Array1<f32>,

    /// Log probabilities of actions, `[batch_size]`.
    pub log_pis: Option<Array1<f32>>,

    /// Sampled slot indices.
    pub ixs: Vec<usize>,
}

impl TransitionBatch {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.ixs.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.ixs.is_empty()
    }
}
