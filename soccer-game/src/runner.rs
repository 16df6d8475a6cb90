use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use itertools::Itertools;

use crate::config::MatchParameter;
use crate::mechanics::match_engine::{MatchMode, SoccerMatch, StepEvent};
use crate::mechanics::pitch::Side;
use crate::mechanics::role::Role;
use crate::persistence::{ModelStore, PassLog, PassStatistics, RunLog, ScoreLog};

/// training progress is logged every this many episodes
pub const PROGRESS_LOG_INTERVAL: u64 = 10;

const SCORE_LOG_FILE: &str = "scores.csv";
const TRAINING_RESULTS_FILE: &str = "training_results.json";
const SIMULATION_RESULTS_FILE: &str = "simulation_results.json";
const PASS_STATISTICS_FILE: &str = "player_stats.json";
const PASS_LOG_FILE: &str = "pass_log.jsonl";

/// Where a run reads and writes its files
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub model_dir: PathBuf,
    pub stats_dir: PathBuf,
    pub seed: Option<u64>,
}

impl RunSettings {
    fn model_store(&self) -> ModelStore { ModelStore::new(&self.model_dir) }

    fn stats_file(
        &self,
        name: &str,
    ) -> PathBuf {
        self.stats_dir.join(name)
    }
}

fn score_record(game: &SoccerMatch) -> BTreeMap<String, u32> {
    game.teams().iter().map(|t| (t.name.clone(), t.score)).collect()
}

/// Plays the current episode or match to its end, `speed` ticks per batch
fn play_to_end(
    game: &mut SoccerMatch,
    speed: u32,
) -> Result<()> {
    let batch = speed.max(1);
    loop {
        for _ in 0..batch {
            if game.step()? == StepEvent::Finished {
                return Ok(());
            }
        }
        log::trace!("tick {}: {}", game.episode_tick(), game.score_line());
    }
}

fn log_progress(
    game: &SoccerMatch,
    episode: u64,
    episodes: u64,
) {
    let epsilon = game.players().map(|p| p.policy.epsilon()).sum::<f64>() / game.players().count() as f64;
    log::info!("episode {}/{}: {}, mean 𝜀={:.3}", episode, episodes, game.score_line(), epsilon);
    for team in game.teams() {
        for (role, player) in team.players.iter().map(|p| (p.role, p)).unique_by(|(role, _)| *role) {
            log::info!("  {} [{}] {}", team.name, role, player.policy.learning_summary());
        }
    }
}

/// Headless training over `episodes` episodes, continuing from stored models and logs
///
/// # Returns
///   the score of each played episode
pub fn train(
    param: &MatchParameter,
    settings: &RunSettings,
    episodes: u64,
    speed: u32,
) -> Result<Vec<(u32, u32)>> {
    log::info!("training for {} episodes ({} ticks per batch)", episodes, speed);
    let mode = MatchMode::Training {
        tick_budget: param.training_tick_budget(),
    };
    let mut game = SoccerMatch::new(param.clone(), mode, settings.seed);
    let store = settings.model_store();
    let loaded = store.load_all(game.teams_mut(), true);
    log::info!("continuing with {} stored models from {}", loaded, store.dir().display());

    let score_log = ScoreLog::new(
        settings.stats_file(SCORE_LOG_FILE),
        [param.teams[0].name.as_str(), param.teams[1].name.as_str()],
    );
    let first_episode = score_log.last_episode()? + 1;
    let mut run_log = RunLog::load(settings.stats_file(TRAINING_RESULTS_FILE))?;
    let mut pass_statistics = PassStatistics::load(settings.stats_file(PASS_STATISTICS_FILE))?;
    let pass_log = PassLog::new(settings.stats_file(PASS_LOG_FILE));

    let started = Instant::now();
    let mut scores = Vec::with_capacity(episodes as usize);
    for e in 0..episodes {
        game.restart();
        play_to_end(&mut game, speed)?;

        let (a, b) = game.score();
        scores.push((a, b));
        score_log.append(first_episode + e, a, b)?;
        run_log.append(score_record(&game));

        let passes = game.take_pass_events();
        passes.iter().for_each(|p| pass_statistics.record(p));
        pass_log.append(&passes)?;

        if (e + 1) % PROGRESS_LOG_INTERVAL == 0 || e + 1 == episodes {
            log_progress(&game, e + 1, episodes);
        }
    }
    log::info!("training finished after {:.1}s", started.elapsed().as_secs_f32());

    for team in game.teams_mut().iter_mut() {
        team.update_skills(|name| pass_statistics.success_ratio(name));
    }
    run_log.store()?;
    pass_statistics.store()?;
    store.save_all(game.teams())?;
    Ok(scores)
}

/// Full matches with countdowns and rounds
///
/// # Returns
///   the final score of each match
pub fn simulate(
    param: &MatchParameter,
    settings: &RunSettings,
    matches: u64,
    load: bool,
    learning: bool,
    speed: u32,
) -> Result<Vec<(u32, u32)>> {
    let mut game = SoccerMatch::new(param.clone(), MatchMode::Match, settings.seed);
    game.set_learning(learning);
    if load {
        let loaded = settings.model_store().load_all(game.teams_mut(), learning);
        log::info!("loaded {} models", loaded);
    }
    let mut run_log = RunLog::load(settings.stats_file(SIMULATION_RESULTS_FILE))?;

    let mut scores = Vec::with_capacity(matches as usize);
    for m in 0..matches {
        game.restart();
        play_to_end(&mut game, speed)?;
        scores.push(game.score());
        let record = run_log.append(score_record(&game));
        log::info!("match {}/{} (#{}) finished: {}", m + 1, matches, record.episode, game.score_line());
    }
    run_log.store()?;
    Ok(scores)
}

/// One training-length game of the trained left team against an untrained right team, without learning
pub fn evaluate(
    param: &MatchParameter,
    settings: &RunSettings,
) -> Result<(u32, u32)> {
    let mode = MatchMode::Training {
        tick_budget: param.training_tick_budget(),
    };
    let mut game = SoccerMatch::new(param.clone(), mode, settings.seed);
    game.set_learning(false);
    let loaded = settings.model_store().load_team(game.team_mut(Side::Left), false);
    log::info!("{} plays with {} trained models", game.team(Side::Left).name, loaded);

    play_to_end(&mut game, 10)?;
    log::info!("final score: {}", game.score_line());
    log::debug!(
        "goalkeeper policies: {}",
        game.teams()
            .iter()
            .flat_map(|t| t.players.iter().filter(|p| p.role == Role::Goalkeeper))
            .map(|p| format!("{} 𝜀={:.3}", p.name, p.policy.epsilon()))
            .join(", ")
    );
    Ok(game.score())
}
