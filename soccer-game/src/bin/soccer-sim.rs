use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use soccer_game::config::MatchParameter;
use soccer_game::log::init_logging;
use soccer_game::runner::{self, RunSettings};

#[derive(Parser)]
#[command(name = "soccer-sim")]
#[command(about = "11 vs 11 soccer simulation with Deep-Q-Learning players", long_about = None)]
struct Cli {
    /// Directory of the per-player model files
    #[arg(long, global = true, default_value = "models")]
    model_dir: PathBuf,

    /// Directory of score, run and pass logs
    #[arg(long, global = true, default_value = "stats")]
    stats_dir: PathBuf,

    /// JSON file overriding match and learning parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train all players in headless episodes
    Train {
        #[arg(long)]
        episodes: u64,

        /// Ticks processed per batch
        #[arg(long, default_value_t = 10)]
        speed: u32,
    },

    /// Play full matches with countdowns and rounds
    Simulate {
        #[arg(long, default_value_t = 1)]
        matches: u64,

        /// Start from the stored models
        #[arg(long)]
        load: bool,

        /// Ticks processed per batch
        #[arg(long, default_value_t = 10)]
        speed: u32,

        /// Play without collecting experience or training
        #[arg(long)]
        no_learning: bool,
    },

    /// Trained team A against untrained team B, without learning
    Test,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let param = match &cli.config {
        Some(file) => MatchParameter::load(file)?,
        None => MatchParameter::default(),
    };
    let settings = RunSettings {
        model_dir: cli.model_dir,
        stats_dir: cli.stats_dir,
        seed: cli.seed,
    };

    match cli.command {
        Command::Train { episodes, speed } => {
            runner::train(&param, &settings, episodes, speed)?;
        }
        Command::Simulate {
            matches,
            load,
            speed,
            no_learning,
        } => {
            runner::simulate(&param, &settings, matches, load, !no_learning, speed)?;
        }
        Command::Test => {
            let (a, b) = runner::evaluate(&param, &settings)?;
            println!("Final score: {} {} : {} {}", param.teams[0].name, a, b, param.teams[1].name);
        }
    }
    Ok(())
}
