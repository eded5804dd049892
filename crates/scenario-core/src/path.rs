//! Ordered record of confirmed decisions for one attempt.

use serde::{Deserialize, Serialize};

use crate::scoring;

/// One confirmed decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub step_id: String,
    pub option_id: String,
    pub score: i64,
}

/// Append-only log of [`PathEntry`] values.
///
/// Entries are never reordered or edited; the only way to shrink the log is
/// [`clear`](PathRecorder::clear), used when an engine is reset for a new
/// attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathRecorder {
    entries: Vec<PathEntry>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: PathEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all recorded scores.
    pub fn total_score(&self) -> i64 {
        scoring::accumulate(&self.entries)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
