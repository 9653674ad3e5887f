//! History - the linear, cursor-addressed list of applied edits.
//!
//! Entries before the cursor are applied; entries from the cursor on can be
//! redone. Recording a new entry discards everything from the cursor on.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::command::Command;
use super::snapshot::SnapshotPair;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// What an entry replays on undo/redo.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// Fine-grained reversible edit
    Command(Command),
    /// Whole-project states either side of a compound edit
    Snapshot(SnapshotPair),
}

/// A single undoable entry with display metadata.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    /// Unique identifier for this entry.
    pub id: Uuid,

    /// Human-readable description of the edit.
    pub description: String,

    /// When the edit was first applied.
    pub timestamp: DateTime<Utc>,

    /// Replay data.
    pub entry: HistoryEntry,
}

impl HistoryRecord {
    pub fn new(description: impl Into<String>, entry: HistoryEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            timestamp: Utc::now(),
            entry,
        }
    }

    /// Whether this entry was recorded as a snapshot pair
    pub fn is_snapshot(&self) -> bool {
        matches!(self.entry, HistoryEntry::Snapshot(_))
    }
}

/// Linear undo history.
#[derive(Debug, Clone)]
pub struct History {
    records: Vec<HistoryRecord>,

    /// Count of records currently applied; index of the next redo.
    cursor: usize,

    max_undo_levels: usize,

    /// Records dropped from the front because of `max_undo_levels`.
    discarded: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl History {
    /// Create an empty history keeping at most `max_levels` entries.
    pub fn new(max_levels: usize) -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
            max_undo_levels: max_levels,
            discarded: 0,
        }
    }

    /// Append an already-applied record.
    ///
    /// Any undone records are dropped first, then the oldest records are
    /// trimmed to stay within the level limit.
    pub fn record(&mut self, record: HistoryRecord) {
        self.records.truncate(self.cursor);
        self.records.push(record);
        self.cursor = self.records.len();
        self.trim_history();
    }

    /// Record that will be reverted by the next undo.
    pub fn peek_undo(&self) -> Option<&HistoryRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// Record that will be re-applied by the next redo.
    pub fn peek_redo(&self) -> Option<&HistoryRecord> {
        self.records.get(self.cursor)
    }

    /// Step the cursor back after a successful undo.
    pub(crate) fn step_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Step the cursor forward after a successful redo.
    pub(crate) fn step_forward(&mut self) {
        self.cursor = (self.cursor + 1).min(self.records.len());
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total records, applied or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.records.len() - self.cursor
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Change the level limit, trimming immediately if needed.
    pub fn set_max_undo_levels(&mut self, max_levels: usize) {
        self.max_undo_levels = max_levels;
        self.trim_history();
    }

    /// Number of records dropped by trimming so far.
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }

    /// Drop the oldest records beyond the level limit.
    fn trim_history(&mut self) {
        if self.records.len() > self.max_undo_levels {
            let excess = self.records.len() - self.max_undo_levels;
            self.records.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
            self.discarded += excess;
        }
    }

    /// Forget every record.
    pub fn clear(&mut self) {
        self.discarded += self.records.len();
        self.records.clear();
        self.cursor = 0;
    }

    /// Undoable records for display, most recent first.
    pub fn summary(&self) -> Vec<(Uuid, String)> {
        self.records[..self.cursor]
            .iter()
            .rev()
            .map(|r| (r.id, r.description.clone()))
            .collect()
    }

    /// Redoable records for display, next redo first.
    pub fn redo_summary(&self) -> Vec<(Uuid, String)> {
        self.records[self.cursor..]
            .iter()
            .map(|r| (r.id, r.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MoveDirection;

    fn record(n: usize) -> HistoryRecord {
        HistoryRecord::new(
            format!("Action {}", n),
            HistoryEntry::Command(Command::move_column(n, MoveDirection::Left)),
        )
    }

    #[test]
    fn test_new_history() {
        let history = History::new(10);
        assert_eq!(history.max_undo_levels(), 10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.peek_undo().is_none());
    }

    #[test]
    fn test_record_advances_cursor() {
        let mut history = History::default();
        history.record(record(1));
        history.record(record(2));
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.peek_undo().unwrap().description, "Action 2");
        assert!(history.peek_redo().is_none());
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut history = History::default();
        for n in 0..4 {
            history.record(record(n));
        }
        history.step_back();
        history.step_back();
        assert_eq!(history.redo_count(), 2);

        history.record(record(9));
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.peek_undo().unwrap().description, "Action 9");
    }

    #[test]
    fn test_trim_history() {
        let mut history = History::new(3);
        for n in 0..5 {
            history.record(record(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.discarded_count(), 2);
        assert_eq!(history.records()[0].description, "Action 2");
    }

    #[test]
    fn test_set_max_undo_levels() {
        let mut history = History::new(10);
        for n in 0..5 {
            history.record(record(n));
        }
        history.set_max_undo_levels(2);
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_summaries() {
        let mut history = History::default();
        for n in 0..3 {
            history.record(record(n));
        }
        history.step_back();

        let undo: Vec<_> = history.summary().into_iter().map(|(_, d)| d).collect();
        assert_eq!(undo, vec!["Action 1", "Action 0"]);
        let redo: Vec<_> = history.redo_summary().into_iter().map(|(_, d)| d).collect();
        assert_eq!(redo, vec!["Action 2"]);
    }

    #[test]
    fn test_clear() {
        let mut history = History::default();
        history.record(record(0));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.discarded_count(), 1);
    }
}
