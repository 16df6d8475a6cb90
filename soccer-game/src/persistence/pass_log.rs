use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::mechanics::pass_tracker::PassEvent;
use crate::persistence::ensure_parent_dir;

/// Append-only JSON lines file, one pass per line
pub struct PassLog {
    file: PathBuf,
}

impl PassLog {
    pub fn new(file: impl Into<PathBuf>) -> Self { Self { file: file.into() } }

    pub fn file(&self) -> &Path { &self.file }

    pub fn append(
        &self,
        events: &[PassEvent],
    ) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        ensure_parent_dir(&self.file)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .with_context(|| format!("failed to open pass log {}", self.file.display()))?;
        let mut writer = BufWriter::new(file);
        for event in events {
            serde_json::to_writer(&mut writer, event)?;
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
