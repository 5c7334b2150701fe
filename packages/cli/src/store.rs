//! Playlists stored as JSON files, one per playlist, named `<id>.json`.

use async_trait::async_trait;
use playlister_editor::{
    Ack, PersistenceError, PersistenceResult, PersistenceService, Playlist, PlaylistSummary,
};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use uuid::Uuid;

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    async fn read(&self, id: &str) -> PersistenceResult<Playlist> {
        let content = tokio::fs::read_to_string(self.path_for(id))
            .await
            .map_err(|e| io_error(id, e))?;

        serde_json::from_str(&content).map_err(PersistenceError::transport)
    }

    /// Write through a temp file so a crash never leaves half a playlist
    async fn write(&self, playlist: &Playlist) -> PersistenceResult<()> {
        let json = serde_json::to_string_pretty(playlist).map_err(PersistenceError::transport)?;
        let target = self.path_for(&playlist.id);
        let temp = self.root.join(format!(".{}.json.tmp", playlist.id));

        tokio::fs::write(&temp, json)
            .await
            .map_err(PersistenceError::transport)?;
        tokio::fs::rename(&temp, &target)
            .await
            .map_err(PersistenceError::transport)?;
        Ok(())
    }

    async fn all(&self) -> PersistenceResult<Vec<Playlist>> {
        let mut playlists = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(playlists),
            Err(e) => return Err(PersistenceError::transport(e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(PersistenceError::transport)?
        {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                    if !id.starts_with('.') {
                        playlists.push(self.read(id).await?);
                    }
                }
            }
        }

        Ok(playlists)
    }
}

fn io_error(id: &str, error: std::io::Error) -> PersistenceError {
    if error.kind() == ErrorKind::NotFound {
        PersistenceError::NotFound(id.to_string())
    } else {
        PersistenceError::transport(error)
    }
}

#[async_trait]
impl PersistenceService for FileStore {
    async fn fetch_playlist(&self, id: &str) -> PersistenceResult<Playlist> {
        self.read(id).await
    }

    async fn fetch_index(&self) -> PersistenceResult<Vec<PlaylistSummary>> {
        let mut index: Vec<PlaylistSummary> =
            self.all().await?.iter().map(Playlist::summary).collect();
        index.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(index)
    }

    async fn create_playlist(&self) -> PersistenceResult<Playlist> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(PersistenceError::transport)?;

        let taken: HashSet<String> = self.all().await?.into_iter().map(|p| p.name).collect();
        let name = (1..)
            .map(|n| format!("Untitled {}", n))
            .find(|name| !taken.contains(name))
            .unwrap_or_else(|| "Untitled".to_string());

        let playlist = Playlist::new(Uuid::new_v4().to_string(), name);
        self.write(&playlist).await?;

        tracing::debug!(playlist = %playlist.id, "Created playlist file");
        Ok(playlist)
    }

    async fn save_playlist(&self, playlist: &Playlist) -> PersistenceResult<Ack> {
        // Saving never resurrects a deleted playlist
        tokio::fs::metadata(self.path_for(&playlist.id))
            .await
            .map_err(|e| io_error(&playlist.id, e))?;

        self.write(playlist).await?;
        Ok(Ack)
    }

    async fn delete_playlist(&self, id: &str) -> PersistenceResult<Ack> {
        tokio::fs::remove_file(self.path_for(id))
            .await
            .map_err(|e| io_error(id, e))?;
        Ok(Ack)
    }
}
