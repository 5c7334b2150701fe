//! # Persistence Contract
//!
//! The remote side of a playlist. The editor only needs these calls to be
//! asynchronous and to report success and failure distinctly; the wire
//! format belongs to the implementation.
//!
//! Every call must be idempotent from the editor's point of view: saving the
//! same playlist twice is harmless.

use crate::model::{Playlist, PlaylistSummary};
use async_trait::async_trait;
use thiserror::Error;

/// Acknowledgement of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ack;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Playlist not found: {0}")]
    NotFound(String),

    /// The request did not complete (network, storage, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote rejected the write because its copy changed underneath
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl PersistenceError {
    pub fn transport(message: impl std::fmt::Display) -> Self {
        PersistenceError::Transport(message.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Async CRUD over remotely stored playlists
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn fetch_playlist(&self, id: &str) -> PersistenceResult<Playlist>;

    /// Id/name pairs of every stored playlist
    async fn fetch_index(&self) -> PersistenceResult<Vec<PlaylistSummary>>;

    /// Create an empty playlist; the service picks its id and name
    async fn create_playlist(&self) -> PersistenceResult<Playlist>;

    /// Replace the stored playlist with this state
    async fn save_playlist(&self, playlist: &Playlist) -> PersistenceResult<Ack>;

    async fn delete_playlist(&self, id: &str) -> PersistenceResult<Ack>;
}
