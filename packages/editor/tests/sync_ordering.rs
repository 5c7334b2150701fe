//! Ordering and failure tests for the write queue
//!
//! Saves are held open by a gate so the tests decide exactly when each
//! in-flight write resolves.

use async_trait::async_trait;
use playlister_editor::{
    Ack, Editor, EditorConfig, MemoryStore, PersistenceResult, PersistenceService, Playlist,
    PlaylistSummary, Song, SongFields, SyncState, SyncStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Semaphore};

// ============================================================================
// HELPERS
// ============================================================================

/// Wraps a MemoryStore; every save reports itself, then waits for a permit
struct GatedStore {
    inner: MemoryStore,
    dispatched: mpsc::UnboundedSender<Playlist>,
    gate: Semaphore,
}

#[async_trait]
impl PersistenceService for GatedStore {
    async fn fetch_playlist(&self, id: &str) -> PersistenceResult<Playlist> {
        self.inner.fetch_playlist(id).await
    }

    async fn fetch_index(&self) -> PersistenceResult<Vec<PlaylistSummary>> {
        self.inner.fetch_index().await
    }

    async fn create_playlist(&self) -> PersistenceResult<Playlist> {
        self.inner.create_playlist().await
    }

    async fn save_playlist(&self, playlist: &Playlist) -> PersistenceResult<Ack> {
        let _ = self.dispatched.send(playlist.clone());
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.save_playlist(playlist).await
    }

    async fn delete_playlist(&self, id: &str) -> PersistenceResult<Ack> {
        self.inner.delete_playlist(id).await
    }
}

struct Harness {
    store: Arc<GatedStore>,
    dispatched: Mutex<mpsc::UnboundedReceiver<Playlist>>,
}

impl Harness {
    fn new(playlist: &Playlist) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(GatedStore {
            inner: MemoryStore::with_playlists(vec![playlist.clone()]),
            dispatched: tx,
            gate: Semaphore::new(0),
        });

        Self {
            store,
            dispatched: Mutex::new(rx),
        }
    }

    /// Wait for the writer to start its next save
    async fn next_dispatch(&self) -> Playlist {
        let mut rx = self.dispatched.lock().await;
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a save")
            .expect("writer closed")
    }

    async fn no_further_dispatch(&self) {
        let mut rx = self.dispatched.lock().await;
        let extra = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(extra.is_err(), "unexpected save: {:?}", extra);
    }

    fn release(&self, count: usize) {
        self.store.gate.add_permits(count);
    }
}

fn seeded() -> Playlist {
    let songs = ["A", "B", "C", "D"]
        .iter()
        .map(|id| Song::with_id(*id, SongFields::new(*id, "Artist", "yt")))
        .collect();
    Playlist::new("p1", "Mix").with_songs(songs)
}

fn ids(doc: &Playlist) -> Vec<&str> {
    doc.songs.iter().map(|s| s.id.as_str()).collect()
}

// ============================================================================
// TEST: COALESCING WHILE A SAVE IS IN FLIGHT
// ============================================================================

#[tokio::test]
async fn test_edits_during_flight_produce_one_save_with_latest_state() {
    let playlist = seeded();
    let harness = Harness::new(&playlist);
    let mut editor = Editor::new(playlist, harness.store.clone(), EditorConfig::default());

    editor.move_song(0, 2).unwrap();
    let first = harness.next_dispatch().await;
    assert_eq!(ids(&first), ["B", "C", "A", "D"]);

    // S1 is in flight; produce several newer states
    editor.rename("Road trip").unwrap();
    editor.delete_song(0).unwrap();
    let last_ticket = editor.add_song().unwrap();
    let latest = editor.playlist().clone();
    assert_eq!(editor.sync_status(), SyncStatus::Saving);

    harness.release(1);
    let second = harness.next_dispatch().await;
    assert_eq!(second, latest);

    harness.release(1);
    last_ticket.await.unwrap();
    harness.no_further_dispatch().await;

    editor.flush().await.unwrap();
    assert_eq!(harness.store.inner.save_log().len(), 2);
    assert_eq!(harness.store.inner.stored("p1").unwrap(), latest);
    assert!(editor
        .stack()
        .records()
        .iter()
        .all(|r| r.sync == SyncState::Synced));
}

#[tokio::test]
async fn test_undo_during_flight_is_what_gets_saved() {
    let playlist = seeded();
    let harness = Harness::new(&playlist);
    let mut editor = Editor::new(playlist.clone(), harness.store.clone(), EditorConfig::default());

    editor.move_song(0, 3).unwrap();
    harness.next_dispatch().await;

    editor.undo().unwrap();
    assert_eq!(editor.playlist(), &playlist);

    harness.release(1);
    let second = harness.next_dispatch().await;
    assert_eq!(second, playlist);

    harness.release(1);
    editor.flush().await.unwrap();
    assert_eq!(harness.store.inner.stored("p1").unwrap(), playlist);
}

// ============================================================================
// TEST: FAILURES NEVER ROLL BACK LOCAL STATE
// ============================================================================

#[tokio::test]
async fn test_late_failure_does_not_revert_undo() {
    let playlist = seeded();
    let harness = Harness::new(&playlist);
    harness.store.inner.fail_next_saves(1);
    let mut editor = Editor::new(playlist.clone(), harness.store.clone(), EditorConfig::default());

    editor.move_song(0, 2).unwrap();
    harness.next_dispatch().await;

    // Undo while the (doomed) save is still in flight
    editor.undo().unwrap();

    harness.release(1);
    harness.next_dispatch().await;
    harness.release(1);
    editor.flush().await.unwrap();

    // The failure of the first save was superseded by the second
    assert_eq!(editor.playlist(), &playlist);
    assert!(editor.can_redo());
    assert_eq!(harness.store.inner.stored("p1").unwrap(), playlist);
}

#[tokio::test]
async fn test_undo_right_after_failed_save() {
    let playlist = seeded();
    let harness = Harness::new(&playlist);
    harness.store.inner.fail_next_saves(1);
    let mut editor = Editor::new(playlist.clone(), harness.store.clone(), EditorConfig::default());

    let ticket = editor.delete_song(2).unwrap();
    harness.next_dispatch().await;
    harness.release(1);
    assert!(ticket.await.is_err());

    assert_eq!(ids(editor.playlist()), ["A", "B", "D"]);
    assert!(matches!(editor.sync_status(), SyncStatus::Failed(_)));
    assert_eq!(editor.stack().failed().count(), 1);

    editor.undo().unwrap();
    assert_eq!(ids(editor.playlist()), ["A", "B", "C", "D"]);

    harness.next_dispatch().await;
    harness.release(1);
    editor.flush().await.unwrap();
    assert_eq!(harness.store.inner.stored("p1").unwrap(), playlist);
}

#[tokio::test]
async fn test_retry_sends_current_state_not_failed_snapshot() {
    let playlist = seeded();
    let harness = Harness::new(&playlist);
    harness.store.inner.fail_next_saves(1);
    let mut editor = Editor::new(playlist, harness.store.clone(), EditorConfig::default());

    editor.rename("First").unwrap();
    let failed = harness.next_dispatch().await;
    harness.release(1);
    assert!(editor.flush().await.is_err());

    editor.move_song(3, 0).unwrap();
    let resent = harness.next_dispatch().await;
    harness.release(1);
    editor.flush().await.unwrap();

    let retried = editor.retry();
    let current = harness.next_dispatch().await;
    harness.release(1);
    retried.await.unwrap();

    assert_eq!(failed.name, "First");
    assert_eq!(ids(&failed), ["A", "B", "C", "D"]);
    assert_eq!(ids(&resent), ["D", "A", "B", "C"]);
    assert_eq!(&current, editor.playlist());
    assert_eq!(editor.sync_status(), SyncStatus::Idle);
}
