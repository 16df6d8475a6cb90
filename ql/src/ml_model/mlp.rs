use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ml_model::{CheckpointError, QValueModel};
use crate::prelude::{ModelActionType, QlError};

const CHECKPOINT_FORMAT_VERSION: u32 = 1;

const ADAM_BETA1: f32 = 0.9;
const ADAM_BETA2: f32 = 0.999;
const ADAM_EPSILON: f32 = 1e-7;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DenseLayer {
    /// rows = outputs, columns = inputs
    weights: DMatrix<f32>,
    bias: DVector<f32>,
}

impl DenseLayer {
    /// He-uniform initialized layer
    fn init<R: Rng>(
        inputs: usize,
        outputs: usize,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / inputs as f32).sqrt();
        Self {
            weights: DMatrix::from_fn(outputs, inputs, |_, _| rng.gen_range(-limit..limit)),
            bias: DVector::zeros(outputs),
        }
    }

    fn shape(&self) -> (usize, usize) { self.weights.shape() }
}

#[derive(Serialize, Deserialize)]
struct Checkpoint {
    format_version: u32,
    input_dim: usize,
    action_space: ModelActionType,
    layers: Vec<DenseLayer>,
}

/// First and second moment estimates for one layer
struct AdamMoments {
    m_weights: DMatrix<f32>,
    v_weights: DMatrix<f32>,
    m_bias: DVector<f32>,
    v_bias: DVector<f32>,
}

struct Adam {
    learning_rate: f32,
    step: i32,
    moments: Vec<AdamMoments>,
}

impl Adam {
    fn new(
        learning_rate: f32,
        layers: &[DenseLayer],
    ) -> Self {
        Self {
            learning_rate,
            step: 0,
            moments: layers
                .iter()
                .map(|l| {
                    let (rows, cols) = l.shape();
                    AdamMoments {
                        m_weights: DMatrix::zeros(rows, cols),
                        v_weights: DMatrix::zeros(rows, cols),
                        m_bias: DVector::zeros(rows),
                        v_bias: DVector::zeros(rows),
                    }
                })
                .collect(),
        }
    }

    fn apply(
        &mut self,
        layers: &mut [DenseLayer],
        gradients: &[(DMatrix<f32>, DVector<f32>)],
    ) {
        self.step += 1;
        let bias_correction1 = 1.0 - ADAM_BETA1.powi(self.step);
        let bias_correction2 = 1.0 - ADAM_BETA2.powi(self.step);
        let step_size = self.learning_rate * bias_correction2.sqrt() / bias_correction1;

        for ((layer, moments), (grad_weights, grad_bias)) in layers.iter_mut().zip(self.moments.iter_mut()).zip(gradients) {
            adam_update(
                layer.weights.as_mut_slice(),
                grad_weights.as_slice(),
                moments.m_weights.as_mut_slice(),
                moments.v_weights.as_mut_slice(),
                step_size,
            );
            adam_update(
                layer.bias.as_mut_slice(),
                grad_bias.as_slice(),
                moments.m_bias.as_mut_slice(),
                moments.v_bias.as_mut_slice(),
                step_size,
            );
        }
    }
}

fn adam_update(
    params: &mut [f32],
    grads: &[f32],
    m: &mut [f32],
    v: &mut [f32],
    step_size: f32,
) {
    for i in 0..params.len() {
        m[i] = ADAM_BETA1 * m[i] + (1.0 - ADAM_BETA1) * grads[i];
        v[i] = ADAM_BETA2 * v[i] + (1.0 - ADAM_BETA2) * grads[i] * grads[i];
        params[i] -= step_size * m[i] / (v[i].sqrt() + ADAM_EPSILON);
    }
}

/// Dense feed-forward network with ReLU hidden layers and a linear output layer,
/// producing one Q-value per action.
pub struct MlpModel {
    input_dim: usize,
    action_space: ModelActionType,
    layers: Vec<DenseLayer>,
    optimizer: Adam,
}

impl MlpModel {
    pub fn new<R: Rng>(
        input_dim: usize,
        hidden_layers: &[usize],
        action_space: ModelActionType,
        learning_rate: f32,
        rng: &mut R,
    ) -> Self {
        assert!(input_dim > 0 && action_space > 0);
        let mut sizes = Vec::with_capacity(hidden_layers.len() + 2);
        sizes.push(input_dim);
        sizes.extend_from_slice(hidden_layers);
        sizes.push(action_space as usize);

        let layers: Vec<DenseLayer> = sizes.windows(2).map(|w| DenseLayer::init(w[0], w[1], rng)).collect();
        let optimizer = Adam::new(learning_rate, &layers);
        Self {
            input_dim,
            action_space,
            layers,
            optimizer,
        }
    }

    /// Layer activations; index 0 is the input, the last one holds the Q-values
    fn forward(
        &self,
        state: &[f32],
    ) -> Vec<DVector<f32>> {
        assert_eq!(state.len(), self.input_dim, "state dimension mismatch. Expected {}, got {}", self.input_dim, state.len());
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(DVector::from_column_slice(state));
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let z = &layer.weights * &activations[i] + &layer.bias;
            let a = if i == last { z } else { z.map(|v| v.max(0.0)) };
            activations.push(a);
        }
        activations
    }

    fn layer_shapes(layers: &[DenseLayer]) -> Vec<(usize, usize)> { layers.iter().map(DenseLayer::shape).collect() }
}

impl QValueModel for MlpModel {
    fn input_dim(&self) -> usize { self.input_dim }

    fn action_space(&self) -> ModelActionType { self.action_space }

    fn predict(
        &self,
        state: &[f32],
    ) -> Vec<f32> {
        let mut activations = self.forward(state);
        activations.pop().map(|q| q.as_slice().to_vec()).unwrap_or_default()
    }

    fn train<const N: usize>(
        &mut self,
        state_batch: [&[f32]; N],
        action_batch: [ModelActionType; N],
        updated_q_values: [f32; N],
    ) -> Result<f32> {
        let mut gradients: Vec<(DMatrix<f32>, DVector<f32>)> = self
            .layers
            .iter()
            .map(|l| {
                let (rows, cols) = l.shape();
                (DMatrix::zeros(rows, cols), DVector::zeros(rows))
            })
            .collect();

        let mut loss = 0.0;
        for i in 0..N {
            let action = action_batch[i];
            if action >= self.action_space {
                return Err(QlError(format!("action {} out of range (0..{})", action, self.action_space)).into());
            }
            let activations = self.forward(state_batch[i]);
            let q_values = &activations[activations.len() - 1];
            let error = q_values[action as usize] - updated_q_values[i];
            loss += error * error;

            // d(loss)/d(q) is non-zero only for the action taken
            let mut delta: DVector<f32> = DVector::zeros(self.action_space as usize);
            delta[action as usize] = 2.0 * error / N as f32;

            for l in (0..self.layers.len()).rev() {
                gradients[l].0 += &delta * activations[l].transpose();
                gradients[l].1 += &delta;
                if l > 0 {
                    let relu_mask = activations[l].map(|a| if a > 0.0 { 1.0 } else { 0.0 });
                    delta = (self.layers[l].weights.transpose() * &delta).component_mul(&relu_mask);
                }
            }
        }

        self.optimizer.apply(&mut self.layers, &gradients);
        Ok(loss / N as f32)
    }

    fn write_checkpoint(
        &self,
        file: &Path,
    ) -> Result<(), CheckpointError> {
        let checkpoint = Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            input_dim: self.input_dim,
            action_space: self.action_space,
            layers: self.layers.clone(),
        };

        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        // never leave a partially written file at the target path
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        rmp_serde::encode::write_named(&mut tmp, &checkpoint)?;
        tmp.as_file().sync_all()?;
        tmp.persist(file).map_err(|e| CheckpointError::Io(e.error))?;
        Ok(())
    }

    fn read_checkpoint(
        &mut self,
        file: &Path,
    ) -> Result<(), CheckpointError> {
        if !file.exists() {
            return Err(CheckpointError::Missing(file.to_path_buf()));
        }
        let checkpoint: Checkpoint = rmp_serde::from_read(BufReader::new(File::open(file)?))?;

        let expected = (CHECKPOINT_FORMAT_VERSION, self.input_dim, self.action_space, Self::layer_shapes(&self.layers));
        let found = (
            checkpoint.format_version,
            checkpoint.input_dim,
            checkpoint.action_space,
            Self::layer_shapes(&checkpoint.layers),
        );
        if expected != found {
            return Err(CheckpointError::Incompatible {
                expected: format!("{:?}", expected),
                found: format!("{:?}", found),
            });
        }

        self.optimizer = Adam::new(self.optimizer.learning_rate, &checkpoint.layers);
        self.layers = checkpoint.layers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn model(seed: u64) -> MlpModel {
        MlpModel::new(4, &[16, 16], 3, 0.01, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_predict_dimensions() {
        let model = model(1);
        assert_eq!(model.predict(&[0.1, 0.2, 0.3, 0.4]).len(), 3);
        assert!((0..3).contains(&model.predict_action(&[0.1, 0.2, 0.3, 0.4])));
    }

    #[test]
    #[should_panic]
    fn test_predict_rejects_wrong_state_dimension() {
        model(1).predict(&[0.1, 0.2]);
    }

    #[test]
    fn test_training_fits_the_selected_action_only() -> Result<()> {
        let mut model = model(7);
        let state = [0.5_f32, -0.25, 0.75, 0.1];

        let mut first_loss = None;
        let mut last_loss = 0.0;
        for _ in 0..300 {
            last_loss = model.train([&state[..]; 4], [1; 4], [2.0; 4])?;
            first_loss.get_or_insert(last_loss);
        }

        let q = model.predict(&state);
        assert!(last_loss < first_loss.unwrap_or(f32::MAX));
        assert!((q[1] - 2.0).abs() < 0.1, "q[1] = {}", q[1]);
        // other outputs are shaped by shared hidden weights, but never targeted directly
        assert_ne!(q[2], 2.0);
        Ok(())
    }

    #[test]
    fn test_train_rejects_out_of_range_action() {
        let mut model = model(3);
        let state = [0.0_f32; 4];
        assert!(model.train([&state[..]], [3], [1.0]).is_err());
    }

    #[test]
    fn test_checkpoint_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("nested").join("player_dqn.bin");
        let state = [0.3_f32, 0.1, -0.6, 0.9];

        let original = model(11);
        original.write_checkpoint(&file)?;

        let mut restored = model(12);
        assert_ne!(restored.predict(&state), original.predict(&state));
        restored.read_checkpoint(&file)?;
        assert_eq!(restored.predict(&state), original.predict(&state));
        Ok(())
    }

    #[test]
    fn test_read_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let result = model(1).read_checkpoint(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(CheckpointError::Missing(_))));
    }

    #[test]
    fn test_read_incompatible_checkpoint_keeps_weights() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("other_dqn.bin");
        MlpModel::new(9, &[16, 16], 3, 0.01, &mut StdRng::seed_from_u64(5)).write_checkpoint(&file)?;

        let mut model = model(2);
        let state = [0.2_f32; 4];
        let before = model.predict(&state);
        let result = model.read_checkpoint(&file);
        assert!(matches!(result, Err(CheckpointError::Incompatible { .. })));
        assert_eq!(model.predict(&state), before);
        Ok(())
    }

    #[test]
    fn test_read_corrupt_checkpoint() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("corrupt_dqn.bin");
        std::fs::write(&file, b"definitely not messagepack")?;
        let result = model(1).read_checkpoint(&file);
        assert!(matches!(result, Err(CheckpointError::Decode(_))));
        Ok(())
    }
}
