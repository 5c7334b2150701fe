use super::{open_library, resolve_playlist};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::{self, BufRead, Write};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Playlist id, id prefix or name
    pub playlist: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn delete(args: DeleteArgs, cwd: &str) -> Result<()> {
    let (_config, mut library) = open_library(cwd)?;
    let id = resolve_playlist(&mut library, &args.playlist).await?;

    let marked = library.mark_for_deletion(&id)?.clone();

    if !args.yes {
        print!("Delete {}? [y/N] ", marked.name.bright_white());
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            library.cancel_deletion();
            println!("Cancelled");
            return Ok(());
        }
    }

    library.confirm_deletion().await?;
    println!("  {} Deleted {}", "✓".green(), marked.name);

    Ok(())
}
