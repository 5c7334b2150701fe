//! # Playlist Transactions
//!
//! Reversible edits to a [`Playlist`].
//!
//! ## Design Principles
//!
//! 1. **Self-contained**: Each transaction captures everything it needs to
//!    apply *and* reverse itself at creation time
//! 2. **Validated**: `apply` and `reverse` check their preconditions first and
//!    leave the playlist untouched when they fail
//! 3. **Pure**: No I/O. Persistence is the editor's business
//!
//! ## Transaction Semantics
//!
//! ### MoveSong
//! - Removes the song at `from` and re-inserts it at `to`
//! - Both indices must be valid positions; `from == to` is a valid no-op
//!
//! ### DeleteSong
//! - Captures the removed song and its index
//! - Reverse re-inserts at the captured index, never at the end
//!
//! ### EditSong
//! - Captures the complete field set before and after, not a diff
//!
//! ### RenamePlaylist
//! - Atomic replacement of the name

use crate::model::{Playlist, Song, SongFields};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reversible edit to a playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transaction {
    /// Replace the playlist name
    RenamePlaylist { before: String, after: String },

    /// Insert a new song at index
    AddSong { song: Song, index: usize },

    /// Remove the song at index
    DeleteSong { song: Song, index: usize },

    /// Replace all editable fields of a song
    EditSong {
        #[serde(rename = "songId")]
        song_id: String,
        before: SongFields,
        after: SongFields,
    },

    /// Move a song from one position to another
    MoveSong { from: usize, to: usize },
}

/// A transaction's captured assumptions no longer hold for the playlist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Index {index} out of range for playlist of {len} songs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Expected song {expected} at index {index}")]
    SongMismatch { index: usize, expected: String },

    #[error("Song {0} no longer has the captured fields")]
    StaleFields(String),

    #[error("Playlist is named {actual:?}, expected {expected:?}")]
    StaleName { expected: String, actual: String },
}

impl Transaction {
    /// Rename the playlist, capturing its current name
    pub fn rename(doc: &Playlist, name: impl Into<String>) -> Self {
        Transaction::RenamePlaylist {
            before: doc.name.clone(),
            after: name.into(),
        }
    }

    /// Append a song to the end of the playlist
    pub fn add_song(doc: &Playlist, song: Song) -> Self {
        Transaction::AddSong {
            song,
            index: doc.len(),
        }
    }

    /// Delete the song at `index`, capturing it for the inverse
    pub fn delete_song(doc: &Playlist, index: usize) -> Result<Self, TransactionError> {
        let song = doc
            .song(index)
            .ok_or(TransactionError::IndexOutOfRange {
                index,
                len: doc.len(),
            })?
            .clone();

        Ok(Transaction::DeleteSong { song, index })
    }

    /// Replace the fields of the song at `index`, capturing the old ones
    pub fn edit_song(
        doc: &Playlist,
        index: usize,
        after: SongFields,
    ) -> Result<Self, TransactionError> {
        let song = doc.song(index).ok_or(TransactionError::IndexOutOfRange {
            index,
            len: doc.len(),
        })?;

        Ok(Transaction::EditSong {
            song_id: song.id.clone(),
            before: song.fields.clone(),
            after,
        })
    }

    pub fn move_song(from: usize, to: usize) -> Self {
        Transaction::MoveSong { from, to }
    }

    /// Human-readable label for undo/redo menus
    pub fn description(&self) -> &'static str {
        match self {
            Transaction::RenamePlaylist { .. } => "Rename list",
            Transaction::AddSong { .. } => "Add song",
            Transaction::DeleteSong { .. } => "Delete song",
            Transaction::EditSong { .. } => "Edit song",
            Transaction::MoveSong { .. } => "Move song",
        }
    }

    /// Apply the edit
    pub fn apply(&self, doc: &mut Playlist) -> Result<(), TransactionError> {
        self.validate(doc)?;

        match self {
            Transaction::RenamePlaylist { after, .. } => {
                doc.name = after.clone();
            }
            Transaction::AddSong { song, index } => {
                doc.songs.insert(*index, song.clone());
            }
            Transaction::DeleteSong { index, .. } => {
                doc.songs.remove(*index);
            }
            Transaction::EditSong { song_id, after, .. } => {
                Self::set_fields(doc, song_id, after)?;
            }
            Transaction::MoveSong { from, to } => {
                Self::shift(doc, *from, *to);
            }
        }

        Ok(())
    }

    /// Undo the edit
    pub fn reverse(&self, doc: &mut Playlist) -> Result<(), TransactionError> {
        self.validate_reverse(doc)?;

        match self {
            Transaction::RenamePlaylist { before, .. } => {
                doc.name = before.clone();
            }
            Transaction::AddSong { index, .. } => {
                doc.songs.remove(*index);
            }
            Transaction::DeleteSong { song, index } => {
                doc.songs.insert(*index, song.clone());
            }
            Transaction::EditSong {
                song_id, before, ..
            } => {
                Self::set_fields(doc, song_id, before)?;
            }
            Transaction::MoveSong { from, to } => {
                Self::shift(doc, *to, *from);
            }
        }

        Ok(())
    }

    /// Check that `apply` would succeed
    pub fn validate(&self, doc: &Playlist) -> Result<(), TransactionError> {
        match self {
            Transaction::RenamePlaylist { before, .. } => Self::expect_name(doc, before),

            Transaction::AddSong { index, .. } => {
                if *index > doc.len() {
                    return Err(TransactionError::IndexOutOfRange {
                        index: *index,
                        len: doc.len(),
                    });
                }
                Ok(())
            }

            Transaction::DeleteSong { song, index } => Self::expect_song_at(doc, *index, &song.id),

            Transaction::EditSong {
                song_id, before, ..
            } => Self::expect_fields(doc, song_id, before),

            Transaction::MoveSong { from, to } => {
                Self::expect_index(doc, *from)?;
                Self::expect_index(doc, *to)
            }
        }
    }

    /// Check that `reverse` would succeed
    pub fn validate_reverse(&self, doc: &Playlist) -> Result<(), TransactionError> {
        match self {
            Transaction::RenamePlaylist { after, .. } => Self::expect_name(doc, after),

            Transaction::AddSong { song, index } => Self::expect_song_at(doc, *index, &song.id),

            Transaction::DeleteSong { index, .. } => {
                if *index > doc.len() {
                    return Err(TransactionError::IndexOutOfRange {
                        index: *index,
                        len: doc.len(),
                    });
                }
                Ok(())
            }

            Transaction::EditSong { song_id, after, .. } => {
                Self::expect_fields(doc, song_id, after)
            }

            Transaction::MoveSong { from, to } => {
                Self::expect_index(doc, *to)?;
                Self::expect_index(doc, *from)
            }
        }
    }

    fn shift(doc: &mut Playlist, from: usize, to: usize) {
        if from != to {
            let song = doc.songs.remove(from);
            doc.songs.insert(to, song);
        }
    }

    fn set_fields(
        doc: &mut Playlist,
        song_id: &str,
        fields: &SongFields,
    ) -> Result<(), TransactionError> {
        let song = doc
            .songs
            .iter_mut()
            .find(|s| s.id == song_id)
            .ok_or_else(|| TransactionError::SongNotFound(song_id.to_string()))?;

        song.fields = fields.clone();
        Ok(())
    }

    fn expect_index(doc: &Playlist, index: usize) -> Result<(), TransactionError> {
        if index >= doc.len() {
            return Err(TransactionError::IndexOutOfRange {
                index,
                len: doc.len(),
            });
        }
        Ok(())
    }

    fn expect_song_at(doc: &Playlist, index: usize, song_id: &str) -> Result<(), TransactionError> {
        Self::expect_index(doc, index)?;

        if doc.songs[index].id != song_id {
            return Err(TransactionError::SongMismatch {
                index,
                expected: song_id.to_string(),
            });
        }
        Ok(())
    }

    fn expect_fields(
        doc: &Playlist,
        song_id: &str,
        fields: &SongFields,
    ) -> Result<(), TransactionError> {
        let song = doc
            .songs
            .iter()
            .find(|s| s.id == song_id)
            .ok_or_else(|| TransactionError::SongNotFound(song_id.to_string()))?;

        if &song.fields != fields {
            return Err(TransactionError::StaleFields(song_id.to_string()));
        }
        Ok(())
    }

    fn expect_name(doc: &Playlist, name: &str) -> Result<(), TransactionError> {
        if doc.name != name {
            return Err(TransactionError::StaleName {
                expected: name.to_string(),
                actual: doc.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(ids: &[&str]) -> Playlist {
        let songs = ids
            .iter()
            .map(|id| Song::with_id(*id, SongFields::new(*id, "Artist", "yt")))
            .collect();
        Playlist::new("p1", "Mix").with_songs(songs)
    }

    fn ids(doc: &Playlist) -> Vec<&str> {
        doc.songs.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut doc = playlist(&["A", "B", "C", "D"]);
        let t = Transaction::move_song(0, 2);

        t.apply(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["B", "C", "A", "D"]);

        t.reverse(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_move_backwards() {
        let mut doc = playlist(&["A", "B", "C", "D"]);
        let t = Transaction::move_song(3, 1);

        t.apply(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "D", "B", "C"]);

        t.reverse(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_move_to_same_index_is_noop() {
        let mut doc = playlist(&["A", "B"]);
        let t = Transaction::move_song(1, 1);

        t.apply(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B"]);
        t.reverse(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B"]);
    }

    #[test]
    fn test_move_out_of_range_is_rejected() {
        let mut doc = playlist(&["A", "B"]);
        let before = doc.clone();

        let err = Transaction::move_song(0, 2).apply(&mut doc).unwrap_err();
        assert_eq!(err, TransactionError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_reverse_restores_original_index() {
        let mut doc = playlist(&["A", "B", "C", "D"]);
        let t = Transaction::delete_song(&doc, 2).unwrap();

        t.apply(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B", "D"]);

        t.reverse(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_delete_rejects_wrong_song_at_index() {
        let doc = playlist(&["A", "B", "C"]);
        let t = Transaction::delete_song(&doc, 1).unwrap();

        let mut shuffled = playlist(&["B", "A", "C"]);
        let err = t.apply(&mut shuffled).unwrap_err();
        assert!(matches!(err, TransactionError::SongMismatch { index: 1, .. }));
        assert_eq!(ids(&shuffled), ["B", "A", "C"]);
    }

    #[test]
    fn test_add_appends_and_reverse_removes() {
        let mut doc = playlist(&["A"]);
        let song = Song::with_id("N", SongFields::default());
        let t = Transaction::add_song(&doc, song);

        t.apply(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A", "N"]);
        assert_eq!(doc.songs[1].fields.title, "Untitled");

        t.reverse(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["A"]);
    }

    #[test]
    fn test_edit_captures_full_field_set() {
        let mut doc = playlist(&["A", "B"]);
        let after = SongFields::new("New title", "New artist", "xyz");
        let t = Transaction::edit_song(&doc, 1, after.clone()).unwrap();

        match &t {
            Transaction::EditSong { before, .. } => assert_eq!(before.title, "B"),
            other => panic!("unexpected transaction: {:?}", other),
        }

        t.apply(&mut doc).unwrap();
        assert_eq!(doc.songs[1].fields, after);

        t.reverse(&mut doc).unwrap();
        assert_eq!(doc.songs[1].fields.title, "B");
    }

    #[test]
    fn test_edit_rejects_drifted_fields() {
        let mut doc = playlist(&["A"]);
        let t = Transaction::edit_song(&doc, 0, SongFields::default()).unwrap();

        doc.songs[0].fields.artist = "Someone else".to_string();
        assert_eq!(
            t.apply(&mut doc).unwrap_err(),
            TransactionError::StaleFields("A".to_string())
        );
    }

    #[test]
    fn test_rename_round_trip() {
        let mut doc = playlist(&[]);
        let t = Transaction::rename(&doc, "Road trip");

        t.apply(&mut doc).unwrap();
        assert_eq!(doc.name, "Road trip");
        assert!(t.apply(&mut doc).is_err());

        t.reverse(&mut doc).unwrap();
        assert_eq!(doc.name, "Mix");
    }

    #[test]
    fn test_transaction_serialization() {
        let t = Transaction::move_song(3, 0);
        let json = serde_json::to_string(&t).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(t, deserialized);
        assert!(json.contains("\"type\":\"moveSong\""));
    }
}
