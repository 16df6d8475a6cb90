//! File adapters around a training or simulation run: model checkpoints, score and run logs, pass records

use std::path::Path;

use anyhow::{Context, Result};

pub mod model_store;
pub mod pass_log;
pub mod pass_stats;
pub mod run_log;
pub mod score_log;

pub use model_store::ModelStore;
pub use pass_log::PassLog;
pub use pass_stats::PassStatistics;
pub use run_log::{RunLog, RunRecord};
pub use score_log::ScoreLog;

/// creates the parent directory of `file`, if needed
fn ensure_parent_dir(file: &Path) -> Result<()> {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create directory {}", dir.display()))
        }
        _ => Ok(()),
    }
}
