mod commands;
mod config;
mod store;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    create, delete, edit, init, list, show, CreateArgs, DeleteArgs, EditArgs, InitArgs, ListArgs,
    ShowArgs,
};

/// Playlister CLI - Playlist editing with undo/redo
#[derive(Parser, Debug)]
#[command(name = "playlister")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor and sync activity (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a playlister.config.json and create the data directory
    Init(InitArgs),

    /// List stored playlists
    List(ListArgs),

    /// Create a new empty playlist
    Create(CreateArgs),

    /// Print a playlist's songs
    Show(ShowArgs),

    /// Delete a playlist
    Delete(DeleteArgs),

    /// Edit a playlist interactively or from a script
    Edit(EditArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::List(args) => list(args, &cwd).await,
        Command::Create(args) => create(args, &cwd).await,
        Command::Show(args) => show(args, &cwd).await,
        Command::Delete(args) => delete(args, &cwd).await,
        Command::Edit(args) => edit(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
