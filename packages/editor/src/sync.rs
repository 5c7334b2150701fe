//! # Write Queue
//!
//! Bridges synchronous local edits to asynchronous saves for one playlist.
//!
//! ## Rules
//!
//! 1. **One write in flight**: a single writer task per playlist performs
//!    saves strictly one after another, so saves reach the remote in
//!    dispatch order
//! 2. **Latest state wins**: a new request replaces any request that has
//!    not been sent yet. Intermediate states are never persisted on their own
//! 3. **No cancellation**: an in-flight save always runs to completion. The
//!    next save is dispatched after it resolves and carries the newest state
//!
//! ```text
//! enqueue(v1) ──► [slot: v1] ──► save(v1) ─────────────┐
//! enqueue(v2) ──► [slot: v2]                           │ in flight
//! enqueue(v3) ──► [slot: v3]  (v2 replaced)            │
//!                                 save(v1) resolves ◄──┘
//!                 [slot: v3] ──► save(v3)
//! ```
//!
//! The slot is a `tokio::sync::watch` channel: it holds exactly one value
//! and wakes the writer only when that value changed since the last read.
//! Each [`SaveTicket`] owns a `oneshot` receiver that the writer completes
//! with the first save whose version covers the ticket's.

use crate::model::Playlist;
use crate::persistence::{Ack, PersistenceError, PersistenceService};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

/// Playlist state queued for saving
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub playlist: Playlist,
}

/// Result of one dispatched save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub version: u64,
    pub result: Result<Ack, PersistenceError>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Edit not saved (version {version}): {error}")]
    SaveFailed {
        version: u64,
        #[source]
        error: PersistenceError,
    },

    #[error("Editor closed before the save completed")]
    Detached,
}

impl SyncError {
    fn from_outcome(outcome: &SaveOutcome) -> Result<(), SyncError> {
        match &outcome.result {
            Ok(_) => Ok(()),
            Err(error) => Err(SyncError::SaveFailed {
                version: outcome.version,
                error: error.clone(),
            }),
        }
    }
}

/// Tickets not yet covered by a completed save, oldest first
type Waiters = Arc<Mutex<Vec<(u64, oneshot::Sender<Result<(), SyncError>>)>>>;
type WaitersGuard<'a> = MutexGuard<'a, Vec<(u64, oneshot::Sender<Result<(), SyncError>>)>>;

/// The pending-write slot of one playlist plus its writer task
pub struct PendingWrite {
    slot: watch::Sender<Option<Snapshot>>,
    settled: watch::Receiver<Option<SaveOutcome>>,
    outcomes: mpsc::UnboundedReceiver<SaveOutcome>,
    waiters: Waiters,
    latest: u64,
}

impl PendingWrite {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(service: Arc<dyn PersistenceService>) -> Self {
        let (slot, queued) = watch::channel(None);
        let (settled_tx, settled) = watch::channel(None);
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        let waiters = Waiters::default();

        tokio::spawn(run_writer(
            service,
            queued,
            settled_tx,
            outcome_tx,
            waiters.clone(),
        ));

        Self {
            slot,
            settled,
            outcomes,
            waiters,
            latest: 0,
        }
    }

    /// Request that `snapshot` be saved, replacing any unsent request
    pub fn enqueue(&mut self, snapshot: Snapshot) -> SaveTicket {
        let version = snapshot.version;
        self.latest = self.latest.max(version);

        let (tx, outcome) = oneshot::channel();
        lock(&self.waiters).push((version, tx));

        tracing::debug!(version, playlist = %snapshot.playlist.id, "Queued save");
        self.slot.send_replace(Some(snapshot));

        SaveTicket { version, outcome }
    }

    /// Newest version whose save has resolved
    pub fn settled_version(&self) -> u64 {
        self.settled
            .borrow()
            .as_ref()
            .map(|o| o.version)
            .unwrap_or(0)
    }

    /// True while some enqueued version has not been settled
    pub fn is_busy(&self) -> bool {
        self.settled_version() < self.latest
    }

    /// Drain outcomes that arrived since the last call
    pub fn drain(&mut self) -> Vec<SaveOutcome> {
        let mut drained = Vec::new();
        while let Ok(outcome) = self.outcomes.try_recv() {
            drained.push(outcome);
        }
        drained
    }

    /// Wait until the newest enqueued version has been settled
    pub async fn idle(&self) -> Result<(), SyncError> {
        let target = self.latest;
        let mut settled = self.settled.clone();

        settled
            .wait_for(|o| o.as_ref().map_or(target == 0, |o| o.version >= target))
            .await
            .map_err(|_| SyncError::Detached)?;

        Ok(())
    }
}

async fn run_writer(
    service: Arc<dyn PersistenceService>,
    mut queued: watch::Receiver<Option<Snapshot>>,
    settled: watch::Sender<Option<SaveOutcome>>,
    outcomes: mpsc::UnboundedSender<SaveOutcome>,
    waiters: Waiters,
) {
    while queued.changed().await.is_ok() {
        // State at dispatch time, not at enqueue time
        let Some(snapshot) = queued.borrow_and_update().clone() else {
            continue;
        };

        tracing::debug!(version = snapshot.version, "Dispatching save");
        let result = service.save_playlist(&snapshot.playlist).await;

        match &result {
            Ok(_) => tracing::debug!(version = snapshot.version, "Save succeeded"),
            Err(e) => tracing::warn!(version = snapshot.version, error = %e, "Save failed"),
        }

        let outcome = SaveOutcome {
            version: snapshot.version,
            result,
        };
        resolve_tickets(&waiters, &outcome);
        let _ = outcomes.send(outcome.clone());
        settled.send_replace(Some(outcome));
    }

    // Remaining tickets resolve as detached
    lock(&waiters).clear();
    tracing::debug!("Write queue closed");
}

fn lock(waiters: &Waiters) -> WaitersGuard<'_> {
    waiters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Complete every ticket covered by `outcome`
fn resolve_tickets(waiters: &Waiters, outcome: &SaveOutcome) {
    let result = SyncError::from_outcome(outcome);

    let mut waiters = lock(waiters);
    let (covered, pending): (Vec<_>, Vec<_>) = waiters
        .drain(..)
        .partition(|(version, _)| *version <= outcome.version);
    *waiters = pending;

    for (_, ticket) in covered {
        let _ = ticket.send(result.clone());
    }
}

/// Resolves with the first completed save that covers its version
///
/// Because unsent requests are replaced, the save that settles a ticket may
/// carry a newer state than the one the ticket was issued for. Later saves
/// never change a ticket's result.
pub struct SaveTicket {
    version: u64,
    outcome: oneshot::Receiver<Result<(), SyncError>>,
}

impl SaveTicket {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub async fn wait(self) -> Result<(), SyncError> {
        self.outcome.await.unwrap_or(Err(SyncError::Detached))
    }
}

impl IntoFuture for SaveTicket {
    type Output = Result<(), SyncError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
