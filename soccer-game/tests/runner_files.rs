use std::path::Path;

use anyhow::Result;
use soccer_game::persistence::{ModelStore, RunLog, ScoreLog};
use soccer_game::runner::{self, RunSettings};

mod common;

fn settings(dir: &Path) -> RunSettings {
    RunSettings {
        model_dir: dir.join("models"),
        stats_dir: dir.join("stats"),
        seed: Some(11),
    }
}

#[test]
fn training_continues_logs_and_stores_models() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = settings(dir.path());
    let param = common::short_match_param();

    assert_eq!(runner::train(&param, &settings, 2, 10)?.len(), 2);

    let store = ModelStore::new(&settings.model_dir);
    assert!(store.model_file("Real Madrid GK").exists());
    assert!(store.model_file("Kairat F2").exists());
    assert_eq!(std::fs::read_dir(&settings.model_dir)?.count(), 22);

    runner::train(&param, &settings, 1, 7)?;
    let score_log = ScoreLog::new(settings.stats_dir.join("scores.csv"), ["Real Madrid", "Kairat"]);
    assert_eq!(score_log.last_episode()?, 3);
    let content = std::fs::read_to_string(score_log.file())?;
    assert!(content.starts_with("Episode,Real Madrid,Kairat\n"));
    assert_eq!(content.lines().count(), 4);

    let run_log = RunLog::load(settings.stats_dir.join("training_results.json"))?;
    assert_eq!(run_log.records().len(), 3);
    assert_eq!(run_log.records()[2].episode, 3);
    assert!(settings.stats_dir.join("player_stats.json").exists());
    Ok(())
}

#[test]
fn simulation_appends_results() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = settings(dir.path());
    let param = common::short_match_param();

    let scores = runner::simulate(&param, &settings, 2, true, false, 5)?;
    assert_eq!(scores.len(), 2);
    runner::simulate(&param, &settings, 1, false, true, 5)?;

    let run_log = RunLog::load(settings.stats_dir.join("simulation_results.json"))?;
    assert_eq!(run_log.records().len(), 3);
    assert!(run_log.records().iter().all(|r| r.score.len() == 2));
    Ok(())
}

#[test]
fn evaluation_plays_one_game() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = settings(dir.path());
    let param = common::short_match_param();

    runner::train(&param, &settings, 1, 10)?;
    let (a, b) = runner::evaluate(&param, &settings)?;
    assert!(a + b < 10);
    Ok(())
}
