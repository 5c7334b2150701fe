//! # Playlist Library
//!
//! Session-level state above a single editor: the index of stored
//! playlists, the playlist currently open for editing, and a pending
//! playlist deletion awaiting confirmation.
//!
//! At most one [`Editor`] is open at a time. Opening another playlist
//! closes the current one first.

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::errors::EditorError;
use crate::model::PlaylistSummary;
use crate::persistence::PersistenceService;
use std::sync::Arc;

pub struct Library {
    service: Arc<dyn PersistenceService>,
    config: EditorConfig,
    index: Vec<PlaylistSummary>,
    current: Option<Editor>,
    marked_for_deletion: Option<PlaylistSummary>,
}

impl Library {
    pub fn new(service: Arc<dyn PersistenceService>, config: EditorConfig) -> Self {
        Self {
            service,
            config,
            index: Vec::new(),
            current: None,
            marked_for_deletion: None,
        }
    }

    /// Fetch the id/name pairs of every stored playlist
    pub async fn load_index(&mut self) -> Result<&[PlaylistSummary], EditorError> {
        self.index = self.service.fetch_index().await?;
        tracing::debug!(count = self.index.len(), "Loaded playlist index");
        Ok(&self.index)
    }

    /// Index entries, with the open playlist's local name
    pub fn index(&self) -> Vec<PlaylistSummary> {
        let mut index = self.index.clone();

        if let Some(editor) = &self.current {
            let open = editor.playlist();
            if let Some(entry) = index.iter_mut().find(|e| e.id == open.id) {
                entry.name = open.name.clone();
            }
        }

        index
    }

    pub fn current(&self) -> Option<&Editor> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Editor> {
        self.current.as_mut()
    }

    /// Load a playlist and open an editor on it
    pub async fn open(&mut self, id: &str) -> Result<&mut Editor, EditorError> {
        let switching = self
            .current
            .as_ref()
            .is_some_and(|editor| editor.playlist().id != id);
        if switching {
            self.close_current().await?;
        }

        if self.current.is_none() {
            let playlist = self.service.fetch_playlist(id).await?;
            self.current = Some(Editor::new(playlist, self.service.clone(), self.config.clone()));
        }

        self.current.as_mut().ok_or(EditorError::NoOpenPlaylist)
    }

    /// Create an empty playlist on the remote and open it
    pub async fn create_new(&mut self) -> Result<&mut Editor, EditorError> {
        if self.current.is_some() {
            self.close_current().await?;
        }

        let playlist = self.service.create_playlist().await?;
        tracing::info!(playlist = %playlist.id, name = %playlist.name, "Created playlist");

        self.index.push(playlist.summary());
        Ok(self
            .current
            .insert(Editor::new(playlist, self.service.clone(), self.config.clone())))
    }

    /// Finish pending saves and close the open playlist
    ///
    /// If the last save failed the editor stays open so it can be retried.
    pub async fn close_current(&mut self) -> Result<(), EditorError> {
        let Some(editor) = self.current.as_mut() else {
            return Ok(());
        };

        editor.flush().await?;

        let summary = editor.playlist().summary();
        if let Some(entry) = self.index.iter_mut().find(|e| e.id == summary.id) {
            entry.name = summary.name;
        }

        tracing::info!(playlist = %summary.id, "Closed playlist");
        self.current = None;
        Ok(())
    }

    pub fn mark_for_deletion(&mut self, id: &str) -> Result<&PlaylistSummary, EditorError> {
        let summary = self
            .index
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownPlaylist(id.to_string()))?;

        Ok(self.marked_for_deletion.insert(summary))
    }

    pub fn marked_for_deletion(&self) -> Option<&PlaylistSummary> {
        self.marked_for_deletion.as_ref()
    }

    pub fn cancel_deletion(&mut self) {
        self.marked_for_deletion = None;
    }

    /// Delete the marked playlist and reload the index
    ///
    /// Deleting the open playlist closes its editor. Saves it already queued
    /// are allowed to finish first, so none of them lands after the delete;
    /// their failures are ignored.
    pub async fn confirm_deletion(&mut self) -> Result<(), EditorError> {
        let marked = self
            .marked_for_deletion
            .take()
            .ok_or(EditorError::NoPlaylistMarked)?;

        let deleting_open = self
            .current
            .as_ref()
            .is_some_and(|editor| editor.playlist().id == marked.id);
        if deleting_open {
            if let Some(mut editor) = self.current.take() {
                if let Err(e) = editor.flush().await {
                    tracing::debug!(playlist = %marked.id, error = %e, "Discarding unsaved edits");
                }
            }
        }

        self.service.delete_playlist(&marked.id).await?;
        tracing::info!(playlist = %marked.id, name = %marked.name, "Deleted playlist");

        self.load_index().await?;
        Ok(())
    }
}
