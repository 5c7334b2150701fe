//! # Document Model
//!
//! Plain data for a playlist and its songs. Nothing in here knows about
//! undo, persistence or the editor; all mutation goes through
//! [`Transaction`](crate::Transaction).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editable fields of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongFields {
    pub title: String,
    pub artist: String,

    /// External media reference (YouTube video id)
    #[serde(rename = "youTubeId")]
    pub youtube_id: String,
}

impl SongFields {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        youtube_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            youtube_id: youtube_id.into(),
        }
    }
}

impl Default for SongFields {
    fn default() -> Self {
        Self::new("Untitled", "Unknown", "dQw4w9WgXcQ")
    }
}

/// A song with a stable identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: SongFields,
}

impl Song {
    /// Create a song with a freshly generated id
    pub fn new(fields: SongFields) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), fields)
    }

    pub fn with_id(id: impl Into<String>, fields: SongFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// A playlist: the document every transaction edits
///
/// Song order is the playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn with_songs(mut self, songs: Vec<Song>) -> Self {
        self.songs = songs;
        self
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn song(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn position_of(&self, song_id: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.id == song_id)
    }

    pub fn summary(&self) -> PlaylistSummary {
        PlaylistSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Id/name pair listed in the playlist index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_serializes_with_external_names() {
        let song = Song::with_id("s1", SongFields::new("Title", "Artist", "abc123"));
        let json = serde_json::to_value(&song).unwrap();

        assert_eq!(json["_id"], "s1");
        assert_eq!(json["title"], "Title");
        assert_eq!(json["youTubeId"], "abc123");
    }

    #[test]
    fn test_new_songs_get_distinct_ids() {
        let a = Song::new(SongFields::default());
        let b = Song::new(SongFields::default());
        assert_ne!(a.id, b.id);
        assert_eq!(a.fields, b.fields);
    }

    #[test]
    fn test_playlist_defaults_missing_songs() {
        let playlist: Playlist = serde_json::from_str(r#"{"_id": "p1", "name": "Mix"}"#).unwrap();
        assert!(playlist.is_empty());
        assert_eq!(playlist.summary().name, "Mix");
    }
}
