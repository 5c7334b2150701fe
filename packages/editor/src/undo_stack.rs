//! # Transaction Stack
//!
//! Tracks transaction history and enables undo/redo operations.
//!
//! ## Design
//!
//! - History is one ordered list plus a cursor
//! - Records before the cursor are applied, records at or after it are not
//! - Undo reverses the record just before the cursor and moves the cursor back
//! - Redo reapplies the record at the cursor and moves the cursor forward
//! - Pushing a new transaction discards everything at or after the cursor
//! - A failed apply/reverse leaves both the playlist and the stack untouched
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = TransactionStack::new();
//! let mut doc = Playlist::new("p1", "Mix");
//!
//! stack.push(Transaction::rename(&doc, "Road trip"), &mut doc)?;
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use crate::model::Playlist;
use crate::transactions::{Transaction, TransactionError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Persistence state of a recorded transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// The latest local change involving this record has not been saved yet
    Pending,
    Synced,
    /// The save covering this record failed; the message is for display only
    Failed(String),
}

/// A transaction on the stack plus its bookkeeping
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: u64,
    pub transaction: Transaction,
    pub created_at: DateTime<Utc>,
    pub sync: SyncState,

    /// Document version produced by the last push/undo/redo of this record
    pub version: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Transaction rejected: {0}")]
    Transaction(#[from] TransactionError),
}

impl StackError {
    /// Undo/redo with nothing to do. Callers should treat this as disabled
    /// rather than failed.
    pub fn is_no_op(&self) -> bool {
        matches!(self, StackError::NothingToUndo | StackError::NothingToRedo)
    }
}

/// Undo/redo stack for playlist editing
#[derive(Debug)]
pub struct TransactionStack {
    records: Vec<TransactionRecord>,

    /// Records in `..cursor` are applied
    cursor: usize,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    next_id: u64,
}

impl TransactionStack {
    /// Create a new stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
            max_levels,
            next_id: 1,
        }
    }

    /// Apply a transaction and record it for undo
    ///
    /// Returns the id of the new record.
    pub fn push(&mut self, transaction: Transaction, doc: &mut Playlist) -> Result<u64, StackError> {
        transaction.apply(doc)?;

        // New edit invalidates the abandoned future
        let discarded = self.records.len() - self.cursor;
        self.records.truncate(self.cursor);
        if discarded > 0 {
            tracing::debug!(discarded, "Dropped redo history");
        }

        let id = self.next_id;
        self.next_id += 1;

        tracing::debug!(id, kind = transaction.description(), "Pushed transaction");

        self.records.push(TransactionRecord {
            id,
            transaction,
            created_at: Utc::now(),
            sync: SyncState::Pending,
            version: 0,
        });
        self.cursor += 1;

        if self.max_levels > 0 && self.records.len() > self.max_levels {
            self.records.remove(0);
            self.cursor -= 1;
        }

        Ok(id)
    }

    /// Reverse the most recently applied transaction
    pub fn undo(&mut self, doc: &mut Playlist) -> Result<u64, StackError> {
        if self.cursor == 0 {
            return Err(StackError::NothingToUndo);
        }

        let record = &self.records[self.cursor - 1];
        record.transaction.reverse(doc)?;
        self.cursor -= 1;

        tracing::debug!(id = record.id, cursor = self.cursor, "Undid transaction");
        Ok(record.id)
    }

    /// Reapply the most recently undone transaction
    pub fn redo(&mut self, doc: &mut Playlist) -> Result<u64, StackError> {
        if self.cursor == self.records.len() {
            return Err(StackError::NothingToRedo);
        }

        let record = &self.records[self.cursor];
        record.transaction.apply(doc)?;
        self.cursor += 1;

        tracing::debug!(id = record.id, cursor = self.cursor, "Redid transaction");
        Ok(record.id)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.cursor
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.records.len() - self.cursor
    }

    /// All records, oldest first
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn record(&self, id: u64) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Mark a record as changed locally at `version`
    pub fn mark_pending(&mut self, id: u64, version: u64) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            record.sync = SyncState::Pending;
            record.version = version;
        }
    }

    /// Record the outcome of a save that carried document `version`
    ///
    /// Every record last touched at or before `version` is covered by that
    /// save. A successful save also clears earlier failures, since it carried
    /// the whole document.
    pub fn settle(&mut self, version: u64, outcome: Result<(), String>) {
        for record in self.records.iter_mut().filter(|r| r.version <= version) {
            match &outcome {
                Ok(()) => record.sync = SyncState::Synced,
                Err(message) => {
                    if record.sync == SyncState::Pending {
                        record.sync = SyncState::Failed(message.clone());
                    }
                }
            }
        }
    }

    /// Records whose last save failed
    pub fn failed(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.sync, SyncState::Failed(_)))
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&'static str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.records.get(i))
            .map(|r| r.transaction.description())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&'static str> {
        self.records
            .get(self.cursor)
            .map(|r| r.transaction.description())
    }
}

impl Default for TransactionStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Song, SongFields};

    fn playlist(ids: &[&str]) -> Playlist {
        let songs = ids
            .iter()
            .map(|id| Song::with_id(*id, SongFields::new(*id, "Artist", "yt")))
            .collect();
        Playlist::new("p1", "Mix").with_songs(songs)
    }

    fn ids(doc: &Playlist) -> Vec<&str> {
        doc.songs.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_stack_creation() {
        let stack = TransactionStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_undo_redo_move() {
        let mut doc = playlist(&["A", "B", "C", "D"]);
        let mut stack = TransactionStack::new();

        stack.push(Transaction::move_song(0, 2), &mut doc).unwrap();
        assert_eq!(ids(&doc), ["B", "C", "A", "D"]);
        assert!(stack.can_undo());

        stack.undo(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B", "C", "D"]);
        assert!(stack.can_redo());

        stack.redo(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["B", "C", "A", "D"]);
        assert_eq!(stack.cursor(), 1);
    }

    #[test]
    fn test_empty_stack_reports_no_op() {
        let mut doc = playlist(&["A"]);
        let mut stack = TransactionStack::new();

        let err = stack.undo(&mut doc).unwrap_err();
        assert_eq!(err, StackError::NothingToUndo);
        assert!(err.is_no_op());

        let err = stack.redo(&mut doc).unwrap_err();
        assert_eq!(err, StackError::NothingToRedo);
        assert!(err.is_no_op());
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut doc = playlist(&["A", "B", "C"]);
        let mut stack = TransactionStack::new();

        stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();
        stack.push(Transaction::move_song(1, 2), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 2);

        stack.push(Transaction::rename(&doc, "Other"), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.redo(&mut doc).unwrap_err(), StackError::NothingToRedo);
    }

    #[test]
    fn test_rejected_push_keeps_redo_history() {
        let mut doc = playlist(&["A", "B"]);
        let mut stack = TransactionStack::new();

        stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();

        let err = stack.push(Transaction::move_song(0, 5), &mut doc).unwrap_err();
        assert!(matches!(err, StackError::Transaction(_)));
        assert!(!err.is_no_op());
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(ids(&doc), ["A", "B"]);
    }

    #[test]
    fn test_rejected_undo_keeps_cursor() {
        let mut doc = playlist(&["A", "B"]);
        let mut stack = TransactionStack::new();

        stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();

        // Structural change behind the stack's back
        doc.songs.pop();

        assert!(stack.undo(&mut doc).is_err());
        assert_eq!(stack.cursor(), 1);
        assert_eq!(ids(&doc), ["B"]);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = playlist(&["A", "B"]);
        let mut stack = TransactionStack::with_max_levels(2);

        for _ in 0..3 {
            stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert!(!stack.can_undo());
        // Oldest move stays applied
        assert_eq!(ids(&doc), ["B", "A"]);
    }

    #[test]
    fn test_descriptions_follow_cursor() {
        let mut doc = playlist(&["A", "B"]);
        let mut stack = TransactionStack::new();

        stack.push(Transaction::rename(&doc, "New"), &mut doc).unwrap();
        stack.push(Transaction::delete_song(&doc, 0).unwrap(), &mut doc).unwrap();
        assert_eq!(stack.undo_description(), Some("Delete song"));
        assert_eq!(stack.redo_description(), None);

        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.undo_description(), Some("Rename list"));
        assert_eq!(stack.redo_description(), Some("Delete song"));
    }

    #[test]
    fn test_settle_marks_covered_records() {
        let mut doc = playlist(&["A", "B"]);
        let mut stack = TransactionStack::new();

        let first = stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();
        stack.mark_pending(first, 1);
        let second = stack.push(Transaction::move_song(0, 1), &mut doc).unwrap();
        stack.mark_pending(second, 2);

        stack.settle(1, Err("offline".to_string()));
        assert_eq!(stack.record(first).unwrap().sync, SyncState::Failed("offline".to_string()));
        assert_eq!(stack.record(second).unwrap().sync, SyncState::Pending);
        assert_eq!(stack.failed().count(), 1);

        stack.settle(2, Ok(()));
        assert_eq!(stack.record(first).unwrap().sync, SyncState::Synced);
        assert_eq!(stack.record(second).unwrap().sync, SyncState::Synced);
    }
}
