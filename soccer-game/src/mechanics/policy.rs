use std::path::Path;

use anyhow::Result;
use ql::learn::{Parameter, QAgent};
use ql::ml_model::{CheckpointError, MlpModel, DEFAULT_BATCH_SIZE};
use ql::prelude::{Action, QlError, StateVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mechanics::action::{DefenderAction, GoalkeeperAction, OutfieldAction, PlayerAction};
use crate::mechanics::role::Role;

pub type GoalkeeperAgent = QAgent<GoalkeeperAction, MlpModel, DEFAULT_BATCH_SIZE>;
pub type DefenderAgent = QAgent<DefenderAction, MlpModel, DEFAULT_BATCH_SIZE>;
pub type OutfieldAgent = QAgent<OutfieldAction, MlpModel, DEFAULT_BATCH_SIZE>;

/// A player's learning agent, typed by the action space of its role
pub enum Policy {
    Goalkeeper(GoalkeeperAgent),
    Defender(DefenderAgent),
    Outfield(OutfieldAgent),
}

fn agent<A: Action>(
    role: Role,
    param: &Parameter,
    rng: &mut StdRng,
) -> QAgent<A, MlpModel, DEFAULT_BATCH_SIZE> {
    let model = MlpModel::new(role.state_dim(), &param.hidden_layers, A::ACTION_SPACE, param.learning_rate, rng);
    QAgent::with_rng(param.clone(), model, StdRng::seed_from_u64(rng.gen()))
}

impl Policy {
    /// fresh, untrained policy for `role`
    pub fn for_role(
        role: Role,
        param: &Parameter,
        rng: &mut StdRng,
    ) -> Self {
        match role {
            Role::Goalkeeper => Policy::Goalkeeper(agent(role, param, rng)),
            Role::Defender => Policy::Defender(agent(role, param, rng)),
            Role::Midfielder | Role::Forward => Policy::Outfield(agent(role, param, rng)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Policy::Goalkeeper(_) => "goalkeeper",
            Policy::Defender(_) => "defender",
            Policy::Outfield(_) => "outfield",
        }
    }

    pub fn choose_action(
        &mut self,
        state: &[f32],
    ) -> Result<PlayerAction> {
        Ok(match self {
            Policy::Goalkeeper(a) => PlayerAction::Goalkeeper(a.choose_action(state)?),
            Policy::Defender(a) => PlayerAction::Defender(a.choose_action(state)?),
            Policy::Outfield(a) => PlayerAction::Outfield(a.choose_action(state)?),
        })
    }

    pub fn remember(
        &mut self,
        state: StateVector,
        action: PlayerAction,
        reward: f32,
        next_state: StateVector,
        done: bool,
    ) -> Result<()> {
        let kind = self.kind();
        match (self, action) {
            (Policy::Goalkeeper(a), PlayerAction::Goalkeeper(action)) => a.remember(state, action, reward, next_state, done),
            (Policy::Defender(a), PlayerAction::Defender(action)) => a.remember(state, action, reward, next_state, done),
            (Policy::Outfield(a), PlayerAction::Outfield(action)) => a.remember(state, action, reward, next_state, done),
            _ => return Err(QlError(format!("action {} does not belong to a {} policy", action, kind)).into()),
        }
        Ok(())
    }

    pub fn replay(&mut self) -> Result<Option<f32>> {
        match self {
            Policy::Goalkeeper(a) => a.replay(),
            Policy::Defender(a) => a.replay(),
            Policy::Outfield(a) => a.replay(),
        }
    }

    pub fn end_episode(&mut self) -> f32 {
        match self {
            Policy::Goalkeeper(a) => a.end_episode(),
            Policy::Defender(a) => a.end_episode(),
            Policy::Outfield(a) => a.end_episode(),
        }
    }

    pub fn epsilon(&self) -> f64 {
        match self {
            Policy::Goalkeeper(a) => a.epsilon(),
            Policy::Defender(a) => a.epsilon(),
            Policy::Outfield(a) => a.epsilon(),
        }
    }

    pub fn learning_summary(&self) -> String {
        match self {
            Policy::Goalkeeper(a) => a.learning_summary(),
            Policy::Defender(a) => a.learning_summary(),
            Policy::Outfield(a) => a.learning_summary(),
        }
    }

    pub fn save(
        &self,
        file: &Path,
    ) -> Result<(), CheckpointError> {
        match self {
            Policy::Goalkeeper(a) => a.save(file),
            Policy::Defender(a) => a.save(file),
            Policy::Outfield(a) => a.save(file),
        }
    }

    pub fn load(
        &mut self,
        file: &Path,
        for_training: bool,
    ) -> Result<(), CheckpointError> {
        match self {
            Policy::Goalkeeper(a) => a.load(file, for_training),
            Policy::Defender(a) => a.load(file, for_training),
            Policy::Outfield(a) => a.load(file, for_training),
        }
    }
}
