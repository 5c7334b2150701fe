//! Error types for the editor

use crate::persistence::PersistenceError;
use crate::sync::SyncError;
use crate::transactions::TransactionError;
use crate::undo_stack::StackError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("{0}")]
    Stack(#[from] StackError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("Playlist name cannot be empty")]
    EmptyName,

    #[error("Playlist is already named '{0}'")]
    Unchanged(String),

    #[error("No song is marked for deletion")]
    NoSongMarked,

    #[error("No playlist is marked for deletion")]
    NoPlaylistMarked,

    #[error("Playlist is not in the index: {0}")]
    UnknownPlaylist(String),

    #[error("No playlist is open")]
    NoOpenPlaylist,
}

impl EditorError {
    /// Undo/redo with nothing to do, or a rename to the current name
    pub fn is_no_op(&self) -> bool {
        match self {
            EditorError::Stack(e) => e.is_no_op(),
            EditorError::Unchanged(_) => true,
            _ => false,
        }
    }

    /// A save failed; local state is intact and the save can be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EditorError::Sync(SyncError::SaveFailed { .. })
                | EditorError::Persistence(PersistenceError::Transport(_))
        )
    }
}
