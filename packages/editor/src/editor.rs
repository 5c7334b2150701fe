//! # Playlist Editor
//!
//! One open playlist: its document, its undo history and its write queue.
//!
//! Every user edit follows the same path:
//!
//! 1. Build a [`Transaction`] from the current document
//! 2. Push it onto the stack, which applies it immediately
//! 3. Queue a save of the whole playlist and hand back a [`SaveTicket`]
//!
//! Local state is authoritative for undo/redo. A failed save never rolls
//! anything back: the affected records are marked failed, the error is
//! reported through [`Editor::poll_sync`] / [`Editor::flush`] and the caller
//! may [`Editor::retry`], which re-sends the *current* playlist.

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::model::{Playlist, Song, SongFields};
use crate::persistence::PersistenceService;
use crate::sync::{PendingWrite, SaveTicket, Snapshot, SyncError};
use crate::transactions::{Transaction, TransactionError};
use crate::undo_stack::TransactionStack;
use std::sync::Arc;

/// Where the editor stands with respect to the remote copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Everything enqueued has been saved
    Idle,

    /// A save is in flight or queued
    Saving,

    /// The latest save failed ("edit not saved - retry")
    Failed(SyncError),
}

pub struct Editor {
    playlist: Playlist,
    stack: TransactionStack,
    writes: PendingWrite,
    config: EditorConfig,

    /// Bumped by every local change that needs saving
    version: u64,

    /// Song awaiting delete confirmation (by id, so edits can't retarget it)
    marked_song: Option<String>,

    last_failure: Option<SyncError>,
}

impl Editor {
    /// Open an editor on a loaded playlist. Must be called inside a tokio
    /// runtime, since it starts the playlist's writer task.
    pub fn new(
        playlist: Playlist,
        service: Arc<dyn PersistenceService>,
        config: EditorConfig,
    ) -> Self {
        tracing::info!(playlist = %playlist.id, songs = playlist.len(), "Opened editor");

        Self {
            playlist,
            stack: TransactionStack::with_max_levels(config.max_undo_levels),
            writes: PendingWrite::spawn(service),
            config,
            version: 0,
            marked_song: None,
            last_failure: None,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn stack(&self) -> &TransactionStack {
        &self.stack
    }

    /// Local version; increases with every push/undo/redo/retry
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rename(&mut self, name: &str) -> Result<SaveTicket, EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }
        if name == self.playlist.name {
            return Err(EditorError::Unchanged(name.to_string()));
        }

        let transaction = Transaction::rename(&self.playlist, name);
        self.push(transaction)
    }

    /// Append a song with the configured default fields
    pub fn add_song(&mut self) -> Result<SaveTicket, EditorError> {
        let fields = self.config.new_song.clone();
        self.add_song_with(fields)
    }

    pub fn add_song_with(&mut self, fields: SongFields) -> Result<SaveTicket, EditorError> {
        let transaction = Transaction::add_song(&self.playlist, Song::new(fields));
        self.push(transaction)
    }

    pub fn delete_song(&mut self, index: usize) -> Result<SaveTicket, EditorError> {
        let transaction = Transaction::delete_song(&self.playlist, index)?;
        self.push(transaction)
    }

    pub fn edit_song(&mut self, index: usize, fields: SongFields) -> Result<SaveTicket, EditorError> {
        let transaction = Transaction::edit_song(&self.playlist, index, fields)?;
        self.push(transaction)
    }

    pub fn move_song(&mut self, from: usize, to: usize) -> Result<SaveTicket, EditorError> {
        self.push(Transaction::move_song(from, to))
    }

    pub fn undo(&mut self) -> Result<SaveTicket, EditorError> {
        let id = self.stack.undo(&mut self.playlist)?;
        Ok(self.commit(id))
    }

    pub fn redo(&mut self) -> Result<SaveTicket, EditorError> {
        let id = self.stack.redo(&mut self.playlist)?;
        Ok(self.commit(id))
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// Remember a song for a later confirmed delete
    pub fn mark_song_for_deletion(&mut self, index: usize) -> Result<&Song, EditorError> {
        let song = self
            .playlist
            .song(index)
            .ok_or(TransactionError::IndexOutOfRange {
                index,
                len: self.playlist.len(),
            })?;

        self.marked_song = Some(song.id.clone());
        Ok(song)
    }

    pub fn marked_song(&self) -> Option<&Song> {
        let id = self.marked_song.as_deref()?;
        self.playlist.songs.iter().find(|s| s.id == id)
    }

    pub fn cancel_song_deletion(&mut self) {
        self.marked_song = None;
    }

    /// Delete the marked song wherever it currently is
    pub fn confirm_song_deletion(&mut self) -> Result<SaveTicket, EditorError> {
        let id = self.marked_song.take().ok_or(EditorError::NoSongMarked)?;
        let index = self
            .playlist
            .position_of(&id)
            .ok_or(TransactionError::SongNotFound(id))?;

        self.delete_song(index)
    }

    /// Re-send the current playlist after a failed save
    pub fn retry(&mut self) -> SaveTicket {
        self.poll_sync();
        self.version += 1;

        let failed: Vec<u64> = self.stack.failed().map(|r| r.id).collect();
        tracing::info!(
            playlist = %self.playlist.id,
            version = self.version,
            failed = failed.len(),
            "Retrying save"
        );
        for id in failed {
            self.stack.mark_pending(id, self.version);
        }

        self.enqueue()
    }

    /// Apply finished saves to the history and return the failures among them
    pub fn poll_sync(&mut self) -> Vec<SyncError> {
        let mut failures = Vec::new();

        for outcome in self.writes.drain() {
            let result = outcome.result.as_ref().map(|_| ()).map_err(|e| e.to_string());
            self.stack.settle(outcome.version, result);

            match outcome.result {
                Ok(_) => self.last_failure = None,
                Err(error) => {
                    let failure = SyncError::SaveFailed {
                        version: outcome.version,
                        error,
                    };
                    self.last_failure = Some(failure.clone());
                    failures.push(failure);
                }
            }
        }

        failures
    }

    pub fn sync_status(&mut self) -> SyncStatus {
        self.poll_sync();

        if self.writes.is_busy() {
            SyncStatus::Saving
        } else if let Some(failure) = &self.last_failure {
            SyncStatus::Failed(failure.clone())
        } else {
            SyncStatus::Idle
        }
    }

    pub fn has_pending_writes(&self) -> bool {
        self.writes.is_busy()
    }

    /// Wait for every queued save to resolve
    ///
    /// Returns the failure of the last save, if it failed.
    pub async fn flush(&mut self) -> Result<(), EditorError> {
        self.writes.idle().await?;
        self.poll_sync();

        match &self.last_failure {
            Some(failure) => Err(failure.clone().into()),
            None => Ok(()),
        }
    }

    fn push(&mut self, transaction: Transaction) -> Result<SaveTicket, EditorError> {
        let id = self.stack.push(transaction, &mut self.playlist)?;
        Ok(self.commit(id))
    }

    fn commit(&mut self, id: u64) -> SaveTicket {
        self.poll_sync();
        self.version += 1;
        self.stack.mark_pending(id, self.version);
        self.enqueue()
    }

    fn enqueue(&mut self) -> SaveTicket {
        self.writes.enqueue(Snapshot {
            version: self.version,
            playlist: self.playlist.clone(),
        })
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if self.writes.is_busy() {
            tracing::warn!(
                playlist = %self.playlist.id,
                version = self.version,
                "Editor closed with saves still pending"
            );
        }
    }
}
