//! Editor settings.

use crate::model::SongFields;
use serde::{Deserialize, Serialize};

/// Settings shared by every editor in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo levels (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Fields given to songs created by "add song"
    #[serde(default)]
    pub new_song: SongFields,
}

fn default_max_undo_levels() -> usize {
    100
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: default_max_undo_levels(),
            new_song: SongFields::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{ "maxUndoLevels": 5 }"#;
        let config: EditorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.max_undo_levels, 5);
        assert_eq!(config.new_song.title, "Untitled");
        assert_eq!(config.new_song.youtube_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_new_song_defaults() {
        let json = r#"{
            "newSong": { "title": "Track", "artist": "Band", "youTubeId": "abc" }
        }"#;
        let config: EditorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.max_undo_levels, 100);
        assert_eq!(config.new_song, SongFields::new("Track", "Band", "abc"));
    }
}
