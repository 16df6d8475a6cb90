use std::ops::Range;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use num_format::ToFormattedString;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::learn::replay_buffer::{Experience, ReplayBuffer};
use crate::ml_model::{CheckpointError, QValueModel};
use crate::prelude::{Action, StateVector};
use crate::util::format;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// Discount rate; (0 <= 𝛾 <= 1) represents the value of future rewards. The bigger, the more farsighted the agent becomes
    pub gamma: f32,
    /// Initial epsilon greedy parameter
    pub epsilon_start: f64,
    /// Minimum epsilon greedy parameter
    pub epsilon_min: f64,
    /// Multiplicative epsilon decay, applied after every training step
    pub epsilon_decay: f64,
    /// Fixed epsilon for a model loaded for evaluation only
    pub epsilon_evaluation: f64,
    // Maximum replay length
    pub history_buffer_len: usize,
    pub learning_rate: f32,
    pub hidden_layers: Vec<usize>,
    pub episode_reward_history_buffer_len: usize,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            epsilon_evaluation: 0.01,
            history_buffer_len: 2_000,
            learning_rate: 0.001,
            hidden_layers: vec![24, 24],
            episode_reward_history_buffer_len: 100,
        }
    }
}

/// Epsilon-greedy deep Q-learning agent, owning its model and its experience.
pub struct QAgent<A, M, const BATCH_SIZE: usize>
where
    A: Action,
    M: QValueModel,
{
    param: Parameter,
    model: M,
    replay_buffer: ReplayBuffer<A>,
    rng: StdRng,
    ///  Epsilon greedy parameter
    epsilon: f64,
    step_count: usize,
    train_count: usize,
    episode_count: usize,
    episode_reward: f32,
    action_counts: FxHashMap<A, usize>,
}

impl<A, M, const BATCH_SIZE: usize> QAgent<A, M, BATCH_SIZE>
where
    A: Action,
    M: QValueModel,
{
    pub fn new(
        param: Parameter,
        model: M,
    ) -> Self {
        Self::with_rng(param, model, StdRng::from_entropy())
    }

    pub fn with_rng(
        param: Parameter,
        model: M,
        rng: StdRng,
    ) -> Self {
        assert_eq!(model.action_space(), A::ACTION_SPACE, "model action space does not match the action type");
        let replay_buffer = ReplayBuffer::new(param.history_buffer_len, param.episode_reward_history_buffer_len);
        let epsilon = param.epsilon_start;
        Self {
            param,
            model,
            replay_buffer,
            rng,
            epsilon,
            step_count: 0,
            train_count: 0,
            episode_count: 0,
            episode_reward: 0.0,
            action_counts: FxHashMap::default(),
        }
    }

    pub fn param(&self) -> &Parameter { &self.param }

    pub fn model(&self) -> &M { &self.model }

    pub fn replay_buffer(&self) -> &ReplayBuffer<A> { &self.replay_buffer }

    pub fn epsilon(&self) -> f64 { self.epsilon }

    pub fn step_count(&self) -> usize { self.step_count }

    pub fn train_count(&self) -> usize { self.train_count }

    pub fn episode_count(&self) -> usize { self.episode_count }

    /// Epsilon-greedy action selection
    pub fn choose_action(
        &mut self,
        state: &[f32],
    ) -> Result<A> {
        self.step_count += 1;
        let numeric = if self.epsilon > self.rng.gen_range(0_f64..1_f64) {
            self.rng.gen_range(0..A::ACTION_SPACE)
        } else {
            self.model.predict_action(state)
        };
        A::try_from_numeric(numeric)
    }

    pub fn remember(
        &mut self,
        state: StateVector,
        action: A,
        reward: f32,
        next_state: StateVector,
        done: bool,
    ) {
        self.episode_reward += reward;
        *self.action_counts.entry(action).or_insert(0) += 1;
        self.replay_buffer.add(Experience {
            state,
            action,
            reward,
            next_state,
            done,
        });
    }

    /// Trains the model with a random batch of remembered experiences and decays epsilon afterwards.
    ///
    /// # Returns
    ///   the training loss, or `None` while there are fewer than `BATCH_SIZE` experiences
    pub fn replay(&mut self) -> Result<Option<f32>> {
        if self.replay_buffer.len() < BATCH_SIZE {
            return Ok(None);
        }

        let indices: [usize; BATCH_SIZE] = sample_distinct_ids(&mut self.rng, 0..self.replay_buffer.len());
        let samples = self.replay_buffer.get_many(&indices);

        let max_future_rewards = self.model.batch_predict_max_future_reward(samples.map(|e| &*e.next_state));
        let rewards = samples.map(|e| e.reward);
        let dones = samples.map(|e| e.done);
        let targets = updated_q_values(&rewards, &max_future_rewards, &dones, self.param.gamma);

        let loss = self.model.train(samples.map(|e| &*e.state), samples.map(|e| e.action.numeric()), targets)?;

        self.epsilon = f64::max(self.epsilon * self.param.epsilon_decay, self.param.epsilon_min);
        self.train_count += 1;
        log::trace!("training step {} loss: {:.4}, 𝜀={:.3}", self.train_count, loss, self.epsilon);
        Ok(Some(loss))
    }

    /// Closes the running episode and returns its accumulated reward
    pub fn end_episode(&mut self) -> f32 {
        let reward = self.episode_reward;
        self.replay_buffer.add_episode_reward(reward);
        self.episode_reward = 0.0;
        self.episode_count += 1;
        reward
    }

    /// Writes the model weights. Epsilon and the replay buffer are not persisted.
    pub fn save(
        &self,
        file: &Path,
    ) -> Result<(), CheckpointError> {
        self.model.write_checkpoint(file)
    }

    /// Restores the model weights.
    /// Unless loaded `for_training`, epsilon is pinned to [Parameter::epsilon_evaluation].
    pub fn load(
        &mut self,
        file: &Path,
        for_training: bool,
    ) -> Result<(), CheckpointError> {
        self.model.read_checkpoint(file)?;
        if !for_training {
            self.epsilon = self.param.epsilon_evaluation;
        }
        Ok(())
    }

    pub fn learning_summary(&self) -> String {
        let number_format = format::number_format();

        let total_actions: usize = self.action_counts.values().sum();
        let action_distribution_line = self
            .action_counts
            .iter()
            .sorted_by_key(|(action, _)| action.numeric())
            .map(|(&action, &count)| {
                let ratio = 100.0 * count as f32 / total_actions as f32;
                format!("{} {:.1}%", action, ratio)
            })
            .join(", ");

        let reward_line = match (self.replay_buffer.avg_episode_reward(), self.replay_buffer.min_episode_reward()) {
            (Some(mean), Some(low)) => format!("{{mean: {:.2}, low: {:.2}}}", mean, low),
            _ => "n/a".to_string(),
        };

        format!(
            "episodes: {}, steps: {}, trainings: {}, 𝛾={:.2}, 𝜀={:.3}, rewards: {}, actions (of {}): {}",
            self.episode_count.to_formatted_string(&number_format),
            self.step_count.to_formatted_string(&number_format),
            self.train_count.to_formatted_string(&number_format),
            self.param.gamma,
            self.epsilon,
            reward_line,
            total_actions.to_formatted_string(&number_format),
            action_distribution_line
        )
    }
}

/// Q value = reward + discount factor * expected future reward.
/// For terminal steps, the updated q-value is exactly the reward.
pub fn updated_q_values<const N: usize>(
    rewards: &[f32; N],
    max_future_rewards: &[f32; N],
    dones: &[bool; N],
    gamma: f32,
) -> [f32; N] {
    std::array::from_fn(|i| {
        if dones[i] {
            rewards[i]
        } else {
            rewards[i] + gamma * max_future_rewards[i]
        }
    })
}

/// `BATCH_SIZE` distinct indices, drawn uniformly from `range`
fn sample_distinct_ids<R: Rng, const BATCH_SIZE: usize>(
    rng: &mut R,
    range: Range<usize>,
) -> [usize; BATCH_SIZE] {
    assert!(range.len() >= BATCH_SIZE);
    let picked = rand::seq::index::sample(rng, range.len(), BATCH_SIZE);
    std::array::from_fn(|i| range.start + picked.index(i))
}
