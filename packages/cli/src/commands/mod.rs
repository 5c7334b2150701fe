pub mod create;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod show;

pub use create::{create, CreateArgs};
pub use delete::{delete, DeleteArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};
pub use show::{show, ShowArgs};

use crate::config::Config;
use crate::store::FileStore;
use playlister_editor::{Library, Playlist};
use std::sync::Arc;

/// Open the library described by the config in `cwd`
pub(crate) fn open_library(cwd: &str) -> anyhow::Result<(Config, Library)> {
    let config = Config::load(cwd)?;
    let store = Arc::new(FileStore::new(config.get_data_dir(cwd)));
    let library = Library::new(store, config.editor.clone());
    Ok((config, library))
}

/// Resolve an id, an id prefix, or an exact name to a playlist id
pub(crate) async fn resolve_playlist(library: &mut Library, key: &str) -> anyhow::Result<String> {
    let index = library.load_index().await?;

    if let Some(entry) = index.iter().find(|e| e.id == key || e.name == key) {
        return Ok(entry.id.clone());
    }

    let matches: Vec<_> = index.iter().filter(|e| e.id.starts_with(key)).collect();
    match matches.as_slice() {
        [entry] => Ok(entry.id.clone()),
        [] => Err(anyhow::anyhow!("No playlist matches '{}'", key)),
        _ => Err(anyhow::anyhow!(
            "'{}' matches {} playlists, use a longer id",
            key,
            matches.len()
        )),
    }
}

/// Song table, numbered from 1
pub(crate) fn print_songs(playlist: &Playlist) {
    use colored::Colorize;

    println!("{} {}", playlist.name.bright_white().bold(), format!("({})", playlist.id).dimmed());

    if playlist.is_empty() {
        println!("  {}", "(no songs)".dimmed());
        return;
    }

    for (i, song) in playlist.songs.iter().enumerate() {
        println!(
            "  {:>3}. {} by {} {}",
            i + 1,
            song.fields.title,
            song.fields.artist.cyan(),
            format!("[{}]", song.fields.youtube_id).dimmed()
        );
    }
}
