use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mechanics::pass_tracker::PassEvent;
use crate::persistence::ensure_parent_dir;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounter {
    pub success: u32,
    pub fail: u32,
}

impl PassCounter {
    pub fn total(&self) -> u32 { self.success + self.fail }

    pub fn success_ratio(&self) -> Option<f32> {
        match self.total() {
            0 => None,
            total => Some(self.success as f32 / total as f32),
        }
    }
}

/// Accumulated pass outcomes per passer name, kept across runs
pub struct PassStatistics {
    file: PathBuf,
    players: BTreeMap<String, PassCounter>,
}

impl PassStatistics {
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let players = if file.exists() {
            let reader =
                BufReader::new(File::open(&file).with_context(|| format!("failed to open pass statistics {}", file.display()))?);
            serde_json::from_reader(reader).with_context(|| format!("invalid pass statistics {}", file.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { file, players })
    }

    pub fn file(&self) -> &Path { &self.file }

    pub fn record(
        &mut self,
        event: &PassEvent,
    ) {
        let counter = self.players.entry(event.passer.clone()).or_default();
        if event.success {
            counter.success += 1;
        } else {
            counter.fail += 1;
        }
    }

    pub fn get(
        &self,
        player_name: &str,
    ) -> Option<PassCounter> {
        self.players.get(player_name).copied()
    }

    pub fn success_ratio(
        &self,
        player_name: &str,
    ) -> Option<f32> {
        self.get(player_name).and_then(|c| c.success_ratio())
    }

    pub fn store(&self) -> Result<()> {
        ensure_parent_dir(&self.file)?;
        let writer =
            BufWriter::new(File::create(&self.file).with_context(|| format!("failed to create pass statistics {}", self.file.display()))?);
        serde_json::to_writer(writer, &self.players).with_context(|| format!("failed to write pass statistics {}", self.file.display()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::mechanics::pass_tracker::{PassType, Pressure};
    use crate::mechanics::role::Role;

    use super::*;

    fn event(
        passer: &str,
        success: bool,
    ) -> PassEvent {
        PassEvent {
            passer: passer.to_string(),
            passer_role: Role::Goalkeeper,
            target: "Kairat D1".to_string(),
            target_role: Role::Defender,
            receiver: "Kairat D1".to_string(),
            distance: 120.0,
            angle: 45.0,
            defender_proximity: 80.0,
            passer_speed: 0.0,
            target_speed: 1.0,
            pass_type: PassType::Short,
            pressure: Pressure::Medium,
            passer_skill: 0.5,
            success,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_counting() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut stats = PassStatistics::load(dir.path().join("player_stats.json"))?;
        stats.record(&event("Kairat GK", true));
        stats.record(&event("Kairat GK", true));
        stats.record(&event("Kairat GK", false));
        stats.record(&event("Kairat GK", true));

        assert_eq!(stats.get("Kairat GK"), Some(PassCounter { success: 3, fail: 1 }));
        assert_eq!(stats.success_ratio("Kairat GK"), Some(0.75));
        assert_eq!(stats.success_ratio("Kairat D1"), None);
        Ok(())
    }

    #[test]
    fn test_counts_accumulate_across_runs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("player_stats.json");
        let mut stats = PassStatistics::load(&file)?;
        stats.record(&event("Real Madrid GK", false));
        stats.store()?;
        assert_eq!(std::fs::read_to_string(&file)?, r#"{"Real Madrid GK":{"success":0,"fail":1}}"#);

        let mut stats = PassStatistics::load(&file)?;
        stats.record(&event("Real Madrid GK", true));
        assert_eq!(stats.success_ratio("Real Madrid GK"), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_empty_counter_has_no_ratio() {
        assert_eq!(PassCounter::default().success_ratio(), None);
    }
}
