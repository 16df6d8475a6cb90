use std::collections::VecDeque;

use crate::prelude::{Action, StateVector};

/// One observed transition
#[derive(Clone, Debug)]
pub struct Experience<A: Action> {
    pub state: StateVector,
    pub action: A,
    pub reward: f32,
    pub next_state: StateVector,
    pub done: bool,
}

/// Bounded FIFO store
pub struct BoundedHistory<T> {
    max_len: usize,
    buffer: VecDeque<T>,
}

impl<T> BoundedHistory<T> {
    pub fn new(max_len: usize) -> Self {
        assert!(max_len > 0);
        Self {
            max_len,
            buffer: VecDeque::with_capacity(max_len),
        }
    }

    pub fn len(&self) -> usize { self.buffer.len() }

    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    pub fn add(
        &mut self,
        element: T,
    ) {
        if self.buffer.len() == self.max_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> { self.buffer.iter() }
}

/// Experience replay buffer.
///
/// Keeps the most recent `history_len` transitions of one agent plus the total rewards of its most recent episodes.
pub struct ReplayBuffer<A: Action> {
    experiences: BoundedHistory<Experience<A>>,
    episode_rewards: BoundedHistory<f32>,
}

impl<A: Action> ReplayBuffer<A> {
    pub fn new(
        history_len: usize,
        episode_reward_history_len: usize,
    ) -> Self {
        Self {
            experiences: BoundedHistory::new(history_len),
            episode_rewards: BoundedHistory::new(episode_reward_history_len),
        }
    }

    pub fn len(&self) -> usize { self.experiences.len() }

    pub fn is_empty(&self) -> bool { self.experiences.is_empty() }

    pub fn add(
        &mut self,
        experience: Experience<A>,
    ) {
        self.experiences.add(experience)
    }

    /// returns references to the experiences at the specified `indices`
    pub fn get_many<const N: usize>(
        &self,
        indices: &[usize; N],
    ) -> [&Experience<A>; N] {
        assert!(indices.iter().all(|&i| i < self.experiences.len()), "index out of range");
        indices.map(|i| &self.experiences.buffer[i])
    }

    pub fn experiences(&self) -> &BoundedHistory<Experience<A>> { &self.experiences }

    pub fn add_episode_reward(
        &mut self,
        episode_reward: f32,
    ) {
        self.episode_rewards.add(episode_reward)
    }

    pub fn episode_rewards(&self) -> Vec<f32> { self.episode_rewards.iter().copied().collect() }

    pub fn avg_episode_reward(&self) -> Option<f32> {
        if self.episode_rewards.is_empty() {
            None
        } else {
            Some(self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32)
        }
    }

    pub fn min_episode_reward(&self) -> Option<f32> {
        self.episode_rewards.iter().copied().reduce(f32::min)
    }
}
