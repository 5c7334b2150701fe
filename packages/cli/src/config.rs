use playlister_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "playlister.config.json";

/// Playlister configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one JSON file per playlist
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Undo depth and new-song defaults
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_data_dir() -> String {
    "playlists".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the data directory
    pub fn get_data_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            editor: EditorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "dataDir": "lists",
            "editor": {
                "maxUndoLevels": 10,
                "newSong": { "title": "?", "artist": "?", "youTubeId": "none" }
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_dir, "lists");
        assert_eq!(config.editor.max_undo_levels, 10);
        assert_eq!(config.editor.new_song.youtube_id, "none");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, "playlists");
        assert_eq!(config.editor.max_undo_levels, 100);
        assert_eq!(config.editor.new_song.title, "Untitled");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.get_data_dir(&cwd), dir.path().join("playlists"));
    }
}
