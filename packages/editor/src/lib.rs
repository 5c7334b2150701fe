//! # Playlister Editor
//!
//! Undoable playlist editing with asynchronous, fallible persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ library: index, open/create/delete/close    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one open playlist                   │
//! │  - Builds transactions from user intents    │
//! │  - Pushes/undoes/redoes on the stack        │
//! │  - Queues a save after every local change   │
//! └─────────────────────────────────────────────┘
//!           ↓                         ↓
//! ┌────────────────────┐   ┌────────────────────┐
//! │ undo_stack +       │   │ sync: one write in │
//! │ transactions       │   │ flight, latest     │
//! │ (sync, in-memory)  │   │ state wins         │
//! └────────────────────┘   └────────────────────┘
//!                                     ↓
//!                          ┌────────────────────┐
//!                          │ PersistenceService │
//!                          └────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Local is authoritative for history**: undo/redo never wait on the
//!    network and are never reverted by a late response
//! 2. **Remote converges eventually**: each save carries the whole playlist
//!    as it is when the save is dispatched
//! 3. **Failures are visible, not silent**: failed saves mark their records
//!    and are retried explicitly
//! 4. **No global state**: one [`Editor`] per open playlist
//!
//! ## Usage
//!
//! ```rust,ignore
//! use playlister_editor::{Editor, EditorConfig, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::with_playlists(vec![playlist.clone()]));
//! let mut editor = Editor::new(playlist, store, EditorConfig::default());
//!
//! // Applied locally right away; the ticket resolves when it is saved
//! let ticket = editor.move_song(0, 2)?;
//! editor.undo()?;
//!
//! if let Err(e) = editor.flush().await {
//!     eprintln!("{e}");
//!     editor.retry();
//! }
//! ```

mod config;
mod editor;
mod errors;
mod library;
mod memory;
mod model;
mod persistence;
mod sync;
mod transactions;
mod undo_stack;

pub use config::EditorConfig;
pub use editor::{Editor, SyncStatus};
pub use errors::EditorError;
pub use library::Library;
pub use memory::MemoryStore;
pub use model::{Playlist, PlaylistSummary, Song, SongFields};
pub use persistence::{Ack, PersistenceError, PersistenceResult, PersistenceService};
pub use sync::{PendingWrite, SaveOutcome, SaveTicket, Snapshot, SyncError};
pub use transactions::{Transaction, TransactionError};
pub use undo_stack::{StackError, SyncState, TransactionRecord, TransactionStack};
