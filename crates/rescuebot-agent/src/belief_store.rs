//! Durable storage of trust beliefs between episodes.
//!
//! Rows are `(teammate, task, competence, willingness)`, one row per task
//! per save. Stores are append-only: every save adds rows, and the latest
//! row per task wins on load. Missing or unusable rows fall back to the
//! configured defaults in [`BeliefSet::from_records`].
//!
//! [`BeliefSet::from_records`]: rescuebot_types::BeliefSet::from_records

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use rescuebot_types::{BeliefRecord, TaskCategory, TeammateId};

use crate::error::AgentError;

/// A synchronous store of belief rows.
pub trait BeliefStore {
    /// The most recent row per task for a teammate. An unknown teammate
    /// yields an empty list.
    fn latest(&self, teammate: &TeammateId) -> Result<Vec<BeliefRecord>, AgentError>;

    /// Append one save's worth of rows.
    fn save(&mut self, records: &[BeliefRecord]) -> Result<(), AgentError>;
}

/// Reduce an ordered row history to the last row per task for a teammate.
///
/// Rows with unknown task labels are kept out; the caller never sees them.
pub fn latest_rows<'a, I>(rows: I, teammate: &TeammateId) -> Vec<BeliefRecord>
where
    I: IntoIterator<Item = &'a BeliefRecord>,
{
    let mut latest: Vec<(TaskCategory, BeliefRecord)> = Vec::new();
    for row in rows {
        if &row.teammate != teammate {
            continue;
        }
        let Some(task) = TaskCategory::parse(&row.task) else {
            continue;
        };
        latest.retain(|(existing, _)| *existing != task);
        latest.push((task, row.clone()));
    }
    latest.sort_by_key(|(task, _)| *task);
    latest.into_iter().map(|(_, row)| row).collect()
}

// ---------------------------------------------------------------------------
// MemoryBeliefStore
// ---------------------------------------------------------------------------

/// In-memory store, used in tests and when no persistence is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryBeliefStore {
    rows: Vec<BeliefRecord>,
}

impl MemoryBeliefStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row ever saved, oldest first.
    pub fn history(&self) -> &[BeliefRecord] {
        &self.rows
    }
}

impl BeliefStore for MemoryBeliefStore {
    fn latest(&self, teammate: &TeammateId) -> Result<Vec<BeliefRecord>, AgentError> {
        Ok(latest_rows(&self.rows, teammate))
    }

    fn save(&mut self, records: &[BeliefRecord]) -> Result<(), AgentError> {
        self.rows.extend_from_slice(records);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonlBeliefStore
// ---------------------------------------------------------------------------

/// Append-only JSON-lines file, one row object per line.
///
/// Lines that fail to parse are skipped with a warning so a partially
/// written or hand-edited file never prevents start-up.
#[derive(Debug, Clone)]
pub struct JsonlBeliefStore {
    path: PathBuf,
}

impl JsonlBeliefStore {
    /// Use the file at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AgentError {
        AgentError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }

    fn read_rows(&self) -> Result<Vec<BeliefRecord>, AgentError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "belief file absent, starting fresh");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        let mut rows = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| self.io_error(err))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BeliefRecord>(&line) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    warn!(path = %self.path.display(), line = number, error = %err, "skipping unparseable belief row");
                }
            }
        }
        Ok(rows)
    }
}

impl BeliefStore for JsonlBeliefStore {
    fn latest(&self, teammate: &TeammateId) -> Result<Vec<BeliefRecord>, AgentError> {
        let rows = self.read_rows()?;
        Ok(latest_rows(&rows, teammate))
    }

    fn save(&mut self, records: &[BeliefRecord]) -> Result<(), AgentError> {
        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.io_error(err))?;
        file.write_all(buffer.as_bytes())
            .map_err(|err| self.io_error(err))?;
        Ok(())
    }
}
