//! Circular replay buffer.
use super::{ReplayBufferConfig, Transition, TransitionBatch};
use crate::error::BufferError;
use log::trace;
use ndarray::{Array1, ArrayBase, ArrayD, Data, Dimension, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A fixed-capacity circular replay buffer.
///
/// Each logical slot `i` holds its own `state_at[i]` and `next_state_at[i]`,
/// so no physical slot is shared between consecutive transitions and
/// wraparound needs no copy step. The state that the next transition will
/// start from is kept in `current`, set by [`ReplayBuffer::reset`] and advanced
/// by [`ReplayBuffer::append`].
pub struct ReplayBuffer {
    capacity: usize,
    cursor: usize,
    size: usize,
    state_shape: Vec<usize>,
    action_shape: Vec<usize>,
    state_dim: usize,
    action_dim: usize,
    state_at: Vec<f32>,
    next_state_at: Vec<f32>,
    action_at: Vec<f32>,
    reward_at: Vec<f32>,
    done_at: Vec<f32>,
    log_pi_at: Option<Vec<f32>>,
    current: Option<Vec<f32>>,
    rng: StdRng,
}

fn check_shape(
    name: &'static str,
    expected: &[usize],
    actual: &[usize],
) -> Result<(), BufferError> {
    if expected != actual {
        return Err(BufferError::InvalidShape {
            name,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

#[inline]
fn write_slot<'a>(dest: &mut [f32], ix: usize, dim: usize, src: impl Iterator<Item = &'a f32>) {
    dest[ix * dim..(ix + 1) * dim]
        .iter_mut()
        .zip(src)
        .for_each(|(d, s)| *d = *s);
}

/// Collects rows `ixs` of `data` into an array of shape `[ixs.len(), *shape]`.
fn gather(data: &[f32], shape: &[usize], dim: usize, ixs: &[usize]) -> ArrayD<f32> {
    let mut batch_shape = Vec::with_capacity(shape.len() + 1);
    batch_shape.push(ixs.len());
    batch_shape.extend_from_slice(shape);

    let mut out = ArrayD::<f32>::zeros(IxDyn(&batch_shape));
    for (mut row, &ix) in out.outer_iter_mut().zip(ixs.iter()) {
        row.iter_mut()
            .zip(&data[ix * dim..(ix + 1) * dim])
            .for_each(|(d, s)| *d = *s);
    }
    out
}

fn slot_array(data: &[f32], shape: &[usize], dim: usize, ix: usize) -> ArrayD<f32> {
    let mut out = ArrayD::<f32>::zeros(IxDyn(shape));
    out.iter_mut()
        .zip(&data[ix * dim..(ix + 1) * dim])
        .for_each(|(d, s)| *d = *s);
    out
}

impl ReplayBuffer {
    /// Builds an empty buffer.
    pub fn build(config: &ReplayBufferConfig) -> Result<Self, BufferError> {
        config.validate()?;
        let capacity = config.capacity;
        let state_dim = config.state_shape.iter().product::<usize>();
        let action_dim = config.action_shape.iter().product::<usize>();

        Ok(Self {
            capacity,
            cursor: 0,
            size: 0,
            state_shape: config.state_shape.clone(),
            action_shape: config.action_shape.clone(),
            state_dim,
            action_dim,
            state_at: vec![0.; capacity * state_dim],
            next_state_at: vec![0.; capacity * state_dim],
            action_at: vec![0.; capacity * action_dim],
            reward_at: vec![0.; capacity],
            done_at: vec![0.; capacity],
            log_pi_at: match config.save_log_pi {
                true => Some(vec![0.; capacity]),
                false => None,
            },
            current: None,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Sets the state from which the next appended transition starts.
    ///
    /// This must be called at the beginning of every episode, before the
    /// first [`ReplayBuffer::append`].
    pub fn reset<S, D>(&mut self, state: &ArrayBase<S, D>) -> Result<(), BufferError>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        check_shape("state", &self.state_shape, state.shape())?;
        self.current = Some(state.iter().copied().collect());
        Ok(())
    }

    /// Appends a transition from the current state to `next_state`.
    ///
    /// The transition is written at the cursor, overwriting the oldest one
    /// when the buffer is full. `next_state` becomes the current state.
    pub fn append<S1, D1, S2, D2>(
        &mut self,
        next_state: &ArrayBase<S1, D1>,
        action: &ArrayBase<S2, D2>,
        reward: f32,
        done: bool,
        log_pi: Option<f32>,
    ) -> Result<(), BufferError>
    where
        S1: Data<Elem = f32>,
        D1: Dimension,
        S2: Data<Elem = f32>,
        D2: Dimension,
    {
        check_shape("state", &self.state_shape, next_state.shape())?;
        check_shape("action", &self.action_shape, action.shape())?;
        if self.log_pi_at.is_some() != log_pi.is_some() {
            return Err(BufferError::LogPiMismatch {
                expected: self.log_pi_at.is_some(),
            });
        }
        let current = self.current.take().ok_or(BufferError::NotReset)?;

        let i = self.cursor;
        if i == 0 && self.size == self.capacity {
            trace!("Replay buffer wraps around");
        }

        write_slot(&mut self.state_at, i, self.state_dim, current.iter());
        write_slot(&mut self.next_state_at, i, self.state_dim, next_state.iter());
        write_slot(&mut self.action_at, i, self.action_dim, action.iter());
        self.reward_at[i] = reward;
        self.done_at[i] = if done { 1.0 } else { 0.0 };
        if let (Some(log_pi_at), Some(log_pi)) = (self.log_pi_at.as_mut(), log_pi) {
            log_pi_at[i] = log_pi;
        }

        self.current = Some(next_state.iter().copied().collect());
        self.cursor = (self.cursor + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);

        Ok(())
    }

    /// Samples a batch with the internal random number generator.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch, BufferError> {
        if self.size == 0 {
            return Err(BufferError::EmptyBuffer);
        }
        let size = self.size;
        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..size))
            .collect::<Vec<_>>();
        Ok(self.batch_at(ixs))
    }

    /// Samples a batch with the given random number generator.
    ///
    /// Unlike [`ReplayBuffer::sample`] this does not mutate the buffer.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        batch_size: usize,
    ) -> Result<TransitionBatch, BufferError> {
        if self.size == 0 {
            return Err(BufferError::EmptyBuffer);
        }
        let ixs = (0..batch_size)
            .map(|_| rng.gen_range(0..self.size))
            .collect::<Vec<_>>();
        Ok(self.batch_at(ixs))
    }

    fn batch_at(&self, ixs: Vec<usize>) -> TransitionBatch {
        TransitionBatch {
            states: gather(&self.state_at, &self.state_shape, self.state_dim, &ixs),
            actions: gather(&self.action_at, &self.action_shape, self.action_dim, &ixs),
            rewards: ixs.iter().map(|&ix| self.reward_at[ix]).collect::<Array1<_>>(),
            next_states: gather(&self.next_state_at, &self.state_shape, self.state_dim, &ixs),
            dones: ixs.iter().map(|&ix| self.done_at[ix]).collect::<Array1<_>>(),
            log_pis: self
                .log_pi_at
                .as_ref()
                .map(|v| ixs.iter().map(|&ix| v[ix]).collect::<Array1<_>>()),
            ixs,
        }
    }

    /// Returns a copy of the transition at logical slot `ix`.
    pub fn transition(&self, ix: usize) -> Option<Transition> {
        if ix >= self.size {
            return None;
        }
        Some(Transition {
            state: slot_array(&self.state_at, &self.state_shape, self.state_dim, ix),
            action: slot_array(&self.action_at, &self.action_shape, self.action_dim, ix),
            reward: self.reward_at[ix],
            done: self.done_at[ix],
            next_state: slot_array(&self.next_state_at, &self.state_shape, self.state_dim, ix),
            log_pi: self.log_pi_at.as_ref().map(|v| v[ix]),
        })
    }

    /// The number of valid transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no transition has been appended.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The slot written by the next append.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn buffer(capacity: usize) -> ReplayBuffer {
        let config = ReplayBufferConfig::default()
            .capacity(capacity)
            .state_shape(vec![1])
            .action_shape(vec![1]);
        ReplayBuffer::build(&config).unwrap()
    }

    fn fill(buffer: &mut ReplayBuffer, n: usize) {
        buffer.reset(&array![0f32]).unwrap();
        for t in 1..=n {
            let s = array![t as f32];
            let a = array![0.1f32 * t as f32];
            buffer.append(&s, &a, t as f32, false, None).unwrap();
        }
    }

    #[test]
    fn test_size_and_cursor() {
        let capacity = 5;
        for n in 0..23 {
            let mut buffer = buffer(capacity);
            fill(&mut buffer, n);
            assert_eq!(buffer.len(), n.min(capacity));
            assert_eq!(buffer.cursor(), n % capacity);
        }
    }

    #[test]
    fn test_adjacency() {
        for n in 2..13 {
            let mut buffer = buffer(5);
            fill(&mut buffer, n);
            let size = buffer.len();
            // The newest slot is followed by the oldest one, which is not adjacent.
            let newest = (buffer.cursor() + size - 1) % size;
            for i in (0..size).filter(|&i| i != newest) {
                let tr = buffer.transition(i).unwrap();
                let tr_next = buffer.transition((i + 1) % size).unwrap();
                assert_eq!(tr.next_state, tr_next.state, "n = {}, i = {}", n, i);
            }
        }
    }

    #[test]
    fn test_wraparound_scenario() {
        let mut buffer = buffer(4);
        buffer.reset(&array![0f32]).unwrap();
        for s in 1..=4 {
            buffer
                .append(&array![s as f32], &array![0.1f32], 1.0, false, None)
                .unwrap();
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.transition(0).unwrap().state, array![0f32].into_dyn());

        buffer
            .append(&array![5f32], &array![0.1f32], 1.0, false, None)
            .unwrap();
        let tr = buffer.transition(0).unwrap();
        assert_eq!(tr.state, array![4f32].into_dyn());
        assert_eq!(tr.next_state, array![5f32].into_dyn());
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn test_reset_starts_new_episode() {
        let mut buffer = buffer(8);
        fill(&mut buffer, 2);
        buffer
            .append(&array![3f32], &array![0.3f32], 0.0, true, None)
            .unwrap();
        buffer.reset(&array![-1f32]).unwrap();
        buffer
            .append(&array![-2f32], &array![0.0f32], 0.0, false, None)
            .unwrap();

        let tr = buffer.transition(2).unwrap();
        assert_eq!(tr.done, 1.0);
        assert_eq!(tr.next_state, array![3f32].into_dyn());
        let tr = buffer.transition(3).unwrap();
        assert_eq!(tr.done, 0.0);
        assert_eq!(tr.state, array![-1f32].into_dyn());
    }

    #[test]
    fn test_sample_support() {
        let mut buffer = buffer(10);
        fill(&mut buffer, 6);
        for _ in 0..100 {
            let batch = buffer.sample(32).unwrap();
            assert_eq!(batch.len(), 32);
            assert!(batch.ixs.iter().all(|&ix| ix < 6));
            for (k, &ix) in batch.ixs.iter().enumerate() {
                // next_state of slot ix is ix + 1 and its reward too.
                assert_eq!(batch.next_states[[k, 0]], (ix + 1) as f32);
                assert_eq!(batch.rewards[k], (ix + 1) as f32);
                assert_eq!(batch.states[[k, 0]], ix as f32);
            }
        }
    }

    #[test]
    fn test_sample_single_transition() {
        let mut buffer = buffer(3);
        fill(&mut buffer, 1);
        let batch = buffer.sample(5).unwrap();
        assert_eq!(batch.states.shape(), &[5, 1]);
        assert_eq!(batch.actions.shape(), &[5, 1]);
        assert_eq!(batch.ixs, vec![0; 5]);
        assert_eq!(batch.rewards, Array1::from(vec![1f32; 5]));
        assert_eq!(batch.dones, Array1::from(vec![0f32; 5]));
        assert!(batch.next_states.iter().all(|&s| s == 1.0));
        assert!(batch.log_pis.is_none());
    }

    #[test]
    fn test_sample_with_external_rng() {
        let mut buffer = buffer(10);
        fill(&mut buffer, 10);
        let mut rng = StdRng::seed_from_u64(0);
        let batch1 = buffer.sample_with(&mut rng, 16).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let batch2 = buffer.sample_with(&mut rng, 16).unwrap();
        assert_eq!(batch1.ixs, batch2.ixs);
        assert_eq!(batch1.states, batch2.states);
    }

    #[test]
    fn test_multi_dimensional_shapes() {
        let config = ReplayBufferConfig::default()
            .capacity(3)
            .state_shape(vec![2, 2])
            .action_shape(vec![3])
            .save_log_pi(true);
        let mut buffer = ReplayBuffer::build(&config).unwrap();
        buffer.reset(&array![[0f32, 1.], [2., 3.]]).unwrap();
        buffer
            .append(
                &array![[4f32, 5.], [6., 7.]],
                &array![0.1f32, 0.2, 0.3],
                0.5,
                false,
                Some(-1.5),
            )
            .unwrap();

        let batch = buffer.sample(2).unwrap();
        assert_eq!(batch.states.shape(), &[2, 2, 2]);
        assert_eq!(batch.next_states.shape(), &[2, 2, 2]);
        assert_eq!(batch.actions.shape(), &[2, 3]);
        assert_eq!(batch.states[[1, 1, 0]], 2.0);
        assert_eq!(batch.next_states[[0, 0, 1]], 5.0);
        assert_eq!(batch.log_pis, Some(Array1::from(vec![-1.5f32; 2])));
    }

    #[test]
    fn test_errors() {
        let mut buffer = buffer(3);
        assert_eq!(buffer.sample(1).unwrap_err(), BufferError::EmptyBuffer);
        assert_eq!(
            buffer
                .append(&array![1f32], &array![0f32], 0.0, false, None)
                .unwrap_err(),
            BufferError::NotReset
        );
        assert!(matches!(
            buffer.reset(&array![0f32, 1.]),
            Err(BufferError::InvalidShape { name: "state", .. })
        ));

        buffer.reset(&array![0f32]).unwrap();
        assert!(matches!(
            buffer.append(&array![1f32], &array![0f32, 0.], 0.0, false, None),
            Err(BufferError::InvalidShape { name: "action", .. })
        ));
        assert!(matches!(
            buffer.append(&array![1f32, 2.], &array![0f32], 0.0, false, None),
            Err(BufferError::InvalidShape { name: "state", .. })
        ));
        assert_eq!(
            buffer
                .append(&array![1f32], &array![0f32], 0.0, false, Some(0.0))
                .unwrap_err(),
            BufferError::LogPiMismatch { expected: false }
        );

        // Failed appends leave the buffer untouched.
        assert!(buffer.is_empty());
        buffer
            .append(&array![1f32], &array![0f32], 0.0, false, None)
            .unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_zero_capacity() {
        let config = ReplayBufferConfig::default().capacity(0);
        assert_eq!(config.validate(), Err(BufferError::InvalidCapacity));
        assert!(matches!(
            ReplayBuffer::build(&config),
            Err(BufferError::InvalidCapacity)
        ));
    }
}
