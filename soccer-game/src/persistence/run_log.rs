use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::persistence::ensure_parent_dir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub episode: u64,
    /// goals per team name
    pub score: BTreeMap<String, u32>,
}

/// JSON array of episode results, rewritten as a whole on [RunLog::store]
pub struct RunLog {
    file: PathBuf,
    records: Vec<RunRecord>,
}

impl RunLog {
    /// Reads the existing records of `file`; a missing file is an empty log
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let records = if file.exists() {
            let reader = BufReader::new(File::open(&file).with_context(|| format!("failed to open run log {}", file.display()))?);
            serde_json::from_reader(reader).with_context(|| format!("invalid run log {}", file.display()))?
        } else {
            vec![]
        };
        Ok(Self { file, records })
    }

    pub fn file(&self) -> &Path { &self.file }

    pub fn records(&self) -> &[RunRecord] { &self.records }

    /// adds a record numbered after the last one
    pub fn append(
        &mut self,
        score: BTreeMap<String, u32>,
    ) -> &RunRecord {
        let episode = self.records.len() as u64 + 1;
        self.records.push(RunRecord { episode, score });
        &self.records[self.records.len() - 1]
    }

    pub fn store(&self) -> Result<()> {
        ensure_parent_dir(&self.file)?;
        let writer = BufWriter::new(File::create(&self.file).with_context(|| format!("failed to create run log {}", self.file.display()))?);
        serde_json::to_writer(writer, &self.records).with_context(|| format!("failed to write run log {}", self.file.display()))
    }
}
