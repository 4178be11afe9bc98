//! Rolling log of completed calculations.
//!
//! Entries are kept newest-first and the log never grows past its capacity:
//! once full, recording a new entry silently drops the oldest one. Readers get
//! borrowed views or cloned snapshots; entries are never edited after they are
//! recorded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entries retained by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Number of entries a history panel lists by default.
pub const DEFAULT_HISTORY_DISPLAY_LIMIT: usize = 10;

/// One completed calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Human-readable form of what was computed, e.g. `"7 add 3"` or `"sqrt(16)"`.
    pub expression: String,
    /// Formatted result, exactly as it was placed on the display.
    pub result: String,
    /// UTC instant at which the result was produced.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Capped, newest-first sequence of [`HistoryEntry`] values.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` entries.
    ///
    /// A capacity of zero is bumped to one so the latest result is always
    /// retrievable.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new entry at the front, dropping the oldest if over capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entry at `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Clone of the first `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Clone of every retained entry, newest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}
