use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use playlister_editor::EditorConfig;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory for playlist files
    #[arg(short, long, default_value = "playlists")]
    pub data_dir: String,

    /// Maximum undo levels per open playlist (0 = unlimited)
    #[arg(short, long, default_value_t = 100)]
    pub max_undo_levels: usize,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing playlist library...".bright_blue().bold());

    let config = Config {
        data_dir: args.data_dir.clone(),
        editor: EditorConfig {
            max_undo_levels: args.max_undo_levels,
            ..EditorConfig::default()
        },
    };

    let data_dir = config.get_data_dir(cwd);
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
        println!("  {} Created {}/", "✓".green(), args.data_dir);
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Library initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: playlister create");
    println!("  2. Run: playlister edit <id>");

    Ok(())
}
