use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::persistence::ensure_parent_dir;

/// Append-only CSV of episode scores: `Episode,<team A>,<team B>`
pub struct ScoreLog {
    file: PathBuf,
    team_names: [String; 2],
}

impl ScoreLog {
    pub fn new(
        file: impl Into<PathBuf>,
        team_names: [&str; 2],
    ) -> Self {
        Self {
            file: file.into(),
            team_names: team_names.map(str::to_string),
        }
    }

    pub fn file(&self) -> &Path { &self.file }

    /// number of the last recorded episode; 0 without any record
    pub fn last_episode(&self) -> Result<u64> {
        if !self.file.exists() {
            return Ok(0);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.file)
            .with_context(|| format!("failed to open score log {}", self.file.display()))?;

        let mut last = 0;
        for record in reader.records() {
            let record = record.with_context(|| format!("invalid score log {}", self.file.display()))?;
            if let Some(episode) = record.get(0) {
                last = episode
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid episode number '{}' in {}", episode, self.file.display()))?;
            }
        }
        Ok(last)
    }

    /// Appends one row; a new file starts with the header
    pub fn append(
        &self,
        episode: u64,
        score_a: u32,
        score_b: u32,
    ) -> Result<()> {
        ensure_parent_dir(&self.file)?;
        let is_new = std::fs::metadata(&self.file).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .with_context(|| format!("failed to open score log {}", self.file.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(["Episode", self.team_names[0].as_str(), self.team_names[1].as_str()])?;
        }
        writer.write_record([episode.to_string(), score_a.to_string(), score_b.to_string()])?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_has_no_episode() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log = ScoreLog::new(dir.path().join("scores.csv"), ["Real Madrid", "Kairat"]);
        assert_eq!(log.last_episode()?, 0);
        std::fs::write(log.file(), "")?;
        assert_eq!(log.last_episode()?, 0);
        Ok(())
    }

    #[test]
    fn test_append_continues_numbering() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log = ScoreLog::new(dir.path().join("stats").join("scores.csv"), ["Real Madrid", "Kairat"]);
        log.append(1, 2, 0)?;
        log.append(2, 1, 1)?;
        assert_eq!(log.last_episode()?, 2);

        let content = std::fs::read_to_string(log.file())?;
        assert_eq!(content, "Episode,Real Madrid,Kairat\n1,2,0\n2,1,1\n");
        Ok(())
    }

    #[test]
    fn test_header_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log = ScoreLog::new(dir.path().join("scores.csv"), ["A", "B"]);
        std::fs::write(log.file(), "Episode,A,B\n")?;
        assert_eq!(log.last_episode()?, 0);
        log.append(1, 0, 3)?;
        assert_eq!(std::fs::read_to_string(log.file())?, "Episode,A,B\n1,0,3\n");
        Ok(())
    }
}
