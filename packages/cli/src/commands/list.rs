use super::open_library;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the index as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn list(args: ListArgs, cwd: &str) -> Result<()> {
    let (_config, mut library) = open_library(cwd)?;
    let index = library.load_index().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(index)?);
        return Ok(());
    }

    if index.is_empty() {
        println!("No playlists yet. Run: playlister create");
        return Ok(());
    }

    for entry in index {
        println!("  {}  {}", entry.id.dimmed(), entry.name.bright_white());
    }
    println!();
    println!("{} playlist(s)", index.len());

    Ok(())
}
