//! In-process [`PersistenceService`], for tests and offline use.
//!
//! Supports injected latency and failures so the editor's synchronization
//! can be exercised without a network.

use crate::model::{Playlist, PlaylistSummary};
use crate::persistence::{Ack, PersistenceError, PersistenceResult, PersistenceService};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default)]
struct StoreState {
    playlists: Vec<Playlist>,
    created: usize,
    failing_saves: usize,
    save_failure: Option<PersistenceError>,
    latency: Option<Duration>,
    save_log: Vec<Playlist>,
}

/// Playlists kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing playlists
    pub fn with_playlists(playlists: Vec<Playlist>) -> Self {
        let store = Self::new();
        store.lock().playlists = playlists;
        store
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    /// Make the next `count` saves fail with a transport error
    pub fn fail_next_saves(&self, count: usize) {
        self.fail_next_saves_with(count, PersistenceError::transport("injected save failure"));
    }

    /// Make the next `count` saves fail with `error`
    pub fn fail_next_saves_with(&self, count: usize, error: PersistenceError) {
        let mut state = self.lock();
        state.failing_saves = count;
        state.save_failure = Some(error);
    }

    /// Every snapshot passed to `save_playlist`, in dispatch order,
    /// including the ones that were made to fail
    pub fn save_log(&self) -> Vec<Playlist> {
        self.lock().save_log.clone()
    }

    /// Current stored copy of a playlist
    pub fn stored(&self, id: &str) -> Option<Playlist> {
        self.lock().playlists.iter().find(|p| p.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn delay(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PersistenceService for MemoryStore {
    async fn fetch_playlist(&self, id: &str) -> PersistenceResult<Playlist> {
        self.delay().await;
        self.stored(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn fetch_index(&self) -> PersistenceResult<Vec<PlaylistSummary>> {
        self.delay().await;
        Ok(self.lock().playlists.iter().map(Playlist::summary).collect())
    }

    async fn create_playlist(&self) -> PersistenceResult<Playlist> {
        self.delay().await;
        let mut state = self.lock();
        state.created += 1;

        let playlist = Playlist::new(
            Uuid::new_v4().to_string(),
            format!("Untitled {}", state.created),
        );
        state.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn save_playlist(&self, playlist: &Playlist) -> PersistenceResult<Ack> {
        self.delay().await;
        let mut state = self.lock();
        state.save_log.push(playlist.clone());

        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            return Err(state
                .save_failure
                .clone()
                .unwrap_or_else(|| PersistenceError::transport("injected save failure")));
        }

        match state.playlists.iter_mut().find(|p| p.id == playlist.id) {
            Some(stored) => {
                *stored = playlist.clone();
                Ok(Ack)
            }
            None => Err(PersistenceError::NotFound(playlist.id.clone())),
        }
    }

    async fn delete_playlist(&self, id: &str) -> PersistenceResult<Ack> {
        self.delay().await;
        let mut state = self.lock();
        let before = state.playlists.len();
        state.playlists.retain(|p| p.id != id);

        if state.playlists.len() == before {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(Ack)
    }
}
