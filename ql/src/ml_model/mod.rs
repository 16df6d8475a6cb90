use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::prelude::ModelActionType;

pub mod mlp;

pub use mlp::MlpModel;

pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint file '{0}' not found")]
    Missing(PathBuf),
    #[error("checkpoint i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("checkpoint decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("incompatible checkpoint: expected {expected}, found {found}")]
    Incompatible { expected: String, found: String },
}

/// Action-value function approximator.
///
/// Maps a state vector of [Self::input_dim] features to one Q-value per action.
pub trait QValueModel {
    fn input_dim(&self) -> usize;

    fn action_space(&self) -> ModelActionType;

    /// Q-values for all actions in `state`
    fn predict(
        &self,
        state: &[f32],
    ) -> Vec<f32>;

    /// Predicts the best action for `state`.
    /// On equal Q-values the lowest action numeric wins.
    fn predict_action(
        &self,
        state: &[f32],
    ) -> ModelActionType {
        argmax(&self.predict(state)) as ModelActionType
    }

    fn batch_predict_max_future_reward<const N: usize>(
        &self,
        state_batch: [&[f32]; N],
    ) -> [f32; N] {
        state_batch.map(|state| {
            self.predict(state)
                .into_iter()
                .fold(f32::NEG_INFINITY, f32::max)
        })
    }

    /// Performs a single training step using a batch of data.
    /// Only the Q-value of the action taken is fitted towards its updated value (mean squared error).
    ///
    /// # Returns
    ///   calculated loss (before the update)
    fn train<const N: usize>(
        &mut self,
        state_batch: [&[f32]; N],
        action_batch: [ModelActionType; N],
        updated_q_values: [f32; N],
    ) -> Result<f32>;

    fn write_checkpoint(
        &self,
        file: &Path,
    ) -> Result<(), CheckpointError>;

    fn read_checkpoint(
        &mut self,
        file: &Path,
    ) -> Result<(), CheckpointError>;
}

/// index of the first maximum value
pub fn argmax(values: &[f32]) -> usize {
    assert!(!values.is_empty());
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[1.0], 0)]
    #[case(&[0.1, 0.5, 0.2], 1)]
    #[case(&[0.7, 0.7, 0.2], 0)]
    #[case(&[-3.0, -1.0, -1.0, -2.0], 1)]
    fn test_argmax(
        #[case] values: &[f32],
        #[case] expected: usize,
    ) {
        assert_eq!(argmax(values), expected);
    }
}
