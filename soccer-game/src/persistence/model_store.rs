use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ql::ml_model::CheckpointError;

use crate::mechanics::team::Team;

/// One model file per player in a directory
pub struct ModelStore {
    dir: PathBuf,
}

/// replaces every character that is not alphanumeric by `_`
pub fn sanitize(name: &str) -> String {
    name.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn model_file(
        &self,
        player_name: &str,
    ) -> PathBuf {
        self.dir.join(format!("{}_dqn.bin", sanitize(player_name)))
    }

    /// Writes the models of all players. Any failure is fatal for the run.
    pub fn save_all(
        &self,
        teams: &[Team],
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| format!("failed to create model directory {}", self.dir.display()))?;
        for player in teams.iter().flat_map(|t| t.players.iter()) {
            let file = self.model_file(&player.name);
            player
                .policy
                .save(&file)
                .with_context(|| format!("failed to save model of {} to {}", player.name, file.display()))?;
        }
        log::info!("saved models to {}", self.dir.display());
        Ok(())
    }

    /// Loads the model of every team player that has one.
    /// Players without a usable model keep their untrained policy.
    ///
    /// # Returns
    ///   the number of loaded models
    pub fn load_team(
        &self,
        team: &mut Team,
        for_training: bool,
    ) -> usize {
        let mut loaded = 0;
        for player in team.players.iter_mut() {
            let file = self.model_file(&player.name);
            match player.policy.load(&file, for_training) {
                Ok(()) => {
                    log::debug!("loaded model of {} from {}", player.name, file.display());
                    loaded += 1;
                }
                Err(CheckpointError::Missing(_)) if for_training => {}
                Err(CheckpointError::Missing(_)) => {
                    log::warn!("no model for {} at {}, playing untrained", player.name, file.display())
                }
                Err(e) => log::warn!("could not load model for {}: {}; keeping the untrained policy", player.name, e),
            }
        }
        loaded
    }

    pub fn load_all(
        &self,
        teams: &mut [Team],
        for_training: bool,
    ) -> usize {
        teams.iter_mut().map(|t| self.load_team(t, for_training)).sum()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::MatchParameter;
    use crate::mechanics::pitch::{Pitch, Side};

    use super::*;

    fn team(seed: u64) -> Team {
        let param = MatchParameter::default();
        Team::new(&param.teams[0], Side::Left, &Pitch::new(&param), &param.learning, &mut StdRng::seed_from_u64(seed))
    }

    fn greedy_predictions(team: &Team) -> Vec<String> {
        use crate::mechanics::policy::Policy;
        use ql::ml_model::QValueModel;
        team.players
            .iter()
            .map(|p| {
                let state = vec![0.3; p.role.state_dim()];
                match &p.policy {
                    Policy::Goalkeeper(a) => format!("{:?}", a.model().predict(&state)),
                    Policy::Defender(a) => format!("{:?}", a.model().predict(&state)),
                    Policy::Outfield(a) => format!("{:?}", a.model().predict(&state)),
                }
            })
            .collect()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Real Madrid GK"), "Real_Madrid_GK");
        assert_eq!(sanitize("A-Team/M1"), "A_Team_M1");
    }

    #[test]
    fn test_model_file() {
        let store = ModelStore::new("models");
        assert_eq!(store.model_file("Kairat F2"), Path::new("models/Kairat_F2_dqn.bin"));
    }

    #[test]
    fn test_save_and_load_all() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ModelStore::new(dir.path().join("models"));
        let saved = team(1);
        store.save_all(std::slice::from_ref(&saved))?;

        let mut restored = team(2);
        assert_ne!(greedy_predictions(&saved), greedy_predictions(&restored));
        assert_eq!(store.load_team(&mut restored, true), 11);
        assert_eq!(greedy_predictions(&saved), greedy_predictions(&restored));
        Ok(())
    }

    #[test]
    fn test_missing_and_corrupt_models_fall_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ModelStore::new(dir.path());
        let mut team = team(3);
        std::fs::write(store.model_file(&team.players[0].name), b"not a model")?;
        let before = greedy_predictions(&team);

        assert_eq!(store.load_team(&mut team, false), 0);
        assert_eq!(greedy_predictions(&team), before);
        Ok(())
    }

    #[test]
    fn test_failed_save_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("models");
        std::fs::write(&blocker, b"a file, not a directory")?;
        let store = ModelStore::new(&blocker);
        assert!(store.save_all(&[team(4)]).is_err());
        Ok(())
    }
}
