use super::{open_library, print_songs, resolve_playlist};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Playlist id, id prefix or name
    pub playlist: String,

    /// Print the stored JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let (_config, mut library) = open_library(cwd)?;
    let id = resolve_playlist(&mut library, &args.playlist).await?;

    let editor = library.open(&id).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(editor.playlist())?);
    } else {
        print_songs(editor.playlist());
    }

    Ok(())
}
