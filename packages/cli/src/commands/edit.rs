//! Line-based editing session over one playlist
//!
//! Commands come from a script file or stdin, one per line. Song numbers
//! are 1-based. Every edit is applied locally at once and saved in the
//! background; `save` waits for the writes to land.

use super::{open_library, print_songs, resolve_playlist};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use playlister_editor::{Editor, EditorError, SongFields, SyncState, SyncStatus};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Playlist id, id prefix or name
    pub playlist: String,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongField {
    Title,
    Artist,
    YouTubeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Rename(String),
    /// `title | artist | youtube id` by position; empty or missing parts use
    /// the configured defaults
    Add(Vec<Option<String>>),
    Edit {
        index: usize,
        field: SongField,
        value: String,
    },
    Delete(usize),
    Mark(usize),
    Confirm,
    Cancel,
    Move {
        from: usize,
        to: usize,
    },
    Undo,
    Redo,
    Show,
    Status,
    History,
    Retry,
    Save,
    Help,
    Quit,
}

impl FromStr for SongField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(SongField::Title),
            "artist" => Ok(SongField::Artist),
            "yt" | "youtube" | "youTubeId" => Ok(SongField::YouTubeId),
            other => Err(anyhow!("Unknown song field '{}' (title, artist, yt)", other)),
        }
    }
}

/// Parse a 1-based song number into an index
fn parse_index(arg: Option<&str>) -> Result<usize> {
    let arg = arg.ok_or_else(|| anyhow!("Missing song number"))?;
    let n: usize = arg
        .parse()
        .map_err(|_| anyhow!("'{}' is not a song number", arg))?;

    n.checked_sub(1)
        .ok_or_else(|| anyhow!("Song numbers start at 1"))
}

impl FromStr for EditCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match verb {
            "rename" => {
                if rest.is_empty() {
                    return Err(anyhow!("Usage: rename <name>"));
                }
                EditCommand::Rename(rest.to_string())
            }
            "add" if rest.is_empty() => EditCommand::Add(Vec::new()),
            "add" => {
                let parts: Vec<Option<String>> = rest
                    .split('|')
                    .map(str::trim)
                    .map(|part| (!part.is_empty()).then(|| part.to_string()))
                    .collect();
                if parts.len() > 3 {
                    return Err(anyhow!("Usage: add [title | artist | yt]"));
                }
                EditCommand::Add(parts)
            }
            "edit" => {
                let index = parse_index(args.next())?;
                let field: SongField = args
                    .next()
                    .ok_or_else(|| anyhow!("Usage: edit <n> title|artist|yt <value>"))?
                    .parse()?;
                let value = args.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(anyhow!("Usage: edit <n> title|artist|yt <value>"));
                }
                EditCommand::Edit { index, field, value }
            }
            "delete" | "rm" => EditCommand::Delete(parse_index(args.next())?),
            "mark" => EditCommand::Mark(parse_index(args.next())?),
            "confirm" => EditCommand::Confirm,
            "cancel" => EditCommand::Cancel,
            "move" | "mv" => {
                let from = parse_index(args.next())?;
                let to = parse_index(args.next())?;
                EditCommand::Move { from, to }
            }
            "undo" | "u" => EditCommand::Undo,
            "redo" | "r" => EditCommand::Redo,
            "show" | "ls" => EditCommand::Show,
            "status" => EditCommand::Status,
            "history" => EditCommand::History,
            "retry" => EditCommand::Retry,
            "save" => EditCommand::Save,
            "help" | "?" => EditCommand::Help,
            "quit" | "exit" | "q" => EditCommand::Quit,
            other => return Err(anyhow!("Unknown command '{}' (try 'help')", other)),
        };

        Ok(command)
    }
}

const HELP: &str = "\
  rename <name>                    rename the playlist
  add [title | artist | yt]        append a song
  edit <n> title|artist|yt <value> change one field of song n
  delete <n>                       delete song n
  mark <n> / confirm / cancel      two-step delete
  move <from> <to>                 move a song
  undo / redo                      step through history
  show / status / history          inspect the playlist
  retry                            re-send after a failed save
  save                             wait for pending saves
  quit                             save and exit";

pub async fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let (config, mut library) = open_library(cwd)?;
    let id = resolve_playlist(&mut library, &args.playlist).await?;
    let new_song = config.editor.new_song.clone();

    let interactive = args.script.is_none();
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.script {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();

    let editor = library.open(&id).await?;
    if interactive {
        print_songs(editor.playlist());
        println!("{}", "Type 'help' for commands".dimmed());
    }

    let mut errors = 0;
    loop {
        if interactive {
            use std::io::Write;
            print!("{} ", ">".bright_blue());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = match line.parse::<EditCommand>() {
            Ok(command) => command,
            Err(err) => {
                errors += 1;
                println!("  {} {}", "✗".red(), err);
                continue;
            }
        };

        if command == EditCommand::Quit {
            break;
        }

        if let Err(err) = run(editor, command, &new_song).await {
            if err.is_no_op() {
                println!("  {} {}", "·".yellow(), err);
            } else {
                errors += 1;
                println!("  {} {}", "✗".red(), err);
            }
        }
    }

    let name = editor.playlist().name.clone();
    library.close_current().await?;
    println!("  {} Saved {}", "✓".green(), name.bright_white());

    if errors > 0 && !interactive {
        return Err(anyhow!("{} command(s) failed", errors));
    }
    Ok(())
}

async fn run(editor: &mut Editor, command: EditCommand, new_song: &SongFields) -> Result<(), EditorError> {
    match command {
        EditCommand::Rename(name) => {
            editor.rename(&name)?;
        }
        EditCommand::Add(parts) => {
            let mut fields = new_song.clone();
            let mut parts = parts.into_iter();
            if let Some(title) = parts.next().flatten() {
                fields.title = title;
            }
            if let Some(artist) = parts.next().flatten() {
                fields.artist = artist;
            }
            if let Some(youtube_id) = parts.next().flatten() {
                fields.youtube_id = youtube_id;
            }
            editor.add_song_with(fields)?;
        }
        EditCommand::Edit { index, field, value } => {
            let mut fields = editor
                .playlist()
                .song(index)
                .map(|song| song.fields.clone())
                .unwrap_or_default();
            match field {
                SongField::Title => fields.title = value,
                SongField::Artist => fields.artist = value,
                SongField::YouTubeId => fields.youtube_id = value,
            }
            editor.edit_song(index, fields)?;
        }
        EditCommand::Delete(index) => {
            editor.delete_song(index)?;
        }
        EditCommand::Mark(index) => {
            let song = editor.mark_song_for_deletion(index)?;
            println!(
                "  Marked {} for deletion ('confirm' or 'cancel')",
                song.fields.title.bright_white()
            );
        }
        EditCommand::Confirm => {
            editor.confirm_song_deletion()?;
        }
        EditCommand::Cancel => editor.cancel_song_deletion(),
        EditCommand::Move { from, to } => {
            editor.move_song(from, to)?;
        }
        EditCommand::Undo => {
            editor.undo()?;
        }
        EditCommand::Redo => {
            editor.redo()?;
        }
        EditCommand::Show => print_songs(editor.playlist()),
        EditCommand::Status => print_status(editor),
        EditCommand::History => print_history(editor),
        EditCommand::Retry => {
            editor.retry();
        }
        EditCommand::Save => {
            editor.flush().await?;
            println!("  {} Saved", "✓".green());
        }
        EditCommand::Help => println!("{}", HELP),
        EditCommand::Quit => {}
    }

    Ok(())
}

fn print_status(editor: &mut Editor) {
    let status = match editor.sync_status() {
        SyncStatus::Idle => "saved".green(),
        SyncStatus::Saving => "saving".yellow(),
        SyncStatus::Failed(err) => format!("edit not saved ({}) - retry", err).red(),
    };

    let stack = editor.stack();
    println!("  sync:  {}", status);
    println!(
        "  undo:  {} ({})",
        stack.undo_levels(),
        stack.undo_description().unwrap_or("-")
    );
    println!(
        "  redo:  {} ({})",
        stack.redo_levels(),
        stack.redo_description().unwrap_or("-")
    );
}

fn print_history(editor: &mut Editor) {
    editor.poll_sync();
    let stack = editor.stack();

    if stack.is_empty() {
        println!("  {}", "(no history)".dimmed());
        return;
    }

    for (i, record) in stack.records().iter().enumerate() {
        let marker = if i + 1 == stack.cursor() { "→" } else { " " };
        let sync = match &record.sync {
            SyncState::Pending => "pending".yellow(),
            SyncState::Synced => "synced".green(),
            SyncState::Failed(_) => "failed".red(),
        };
        let line = format!(
            "{} {:>3}. {:<14} {} {}",
            marker,
            record.id,
            record.transaction.description(),
            record.created_at.format("%H:%M:%S"),
            sync
        );

        if i < stack.cursor() {
            println!("  {}", line);
        } else {
            println!("  {}", line.dimmed());
        }
    }
}
