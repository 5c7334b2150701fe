use super::open_library;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Name for the new playlist (defaults to "Untitled N")
    pub name: Option<String>,
}

pub async fn create(args: CreateArgs, cwd: &str) -> Result<()> {
    let (_config, mut library) = open_library(cwd)?;
    library.load_index().await?;

    let editor = library.create_new().await?;
    if let Some(name) = &args.name {
        match editor.rename(name) {
            Err(err) if !err.is_no_op() => return Err(err.into()),
            _ => {}
        }
    }
    let id = editor.playlist().id.clone();
    let name = editor.playlist().name.clone();

    library.close_current().await?;

    println!("  {} Created {} {}", "✓".green(), name.bright_white(), format!("({})", id).dimmed());
    Ok(())
}
