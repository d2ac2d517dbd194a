//! Todo CLI
//!
//! Command-line client for a local todo list with optional remote sync.
//!
//! # Commands
//!
//! - `list` - Show items in creation order
//! - `add` - Create an item
//! - `done` - Mark an item done (or not, with `--undo`)
//! - `remove` - Delete an item
//! - `import` - Replace the list with the contents of a JSON or CSV file
//! - `export` - Write the list to a JSON or CSV file
//! - `sync` - Merge with the remote service and push the result

mod commands;

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use todo_codec::Importance;
use todo_core::StoreConfig;
use tracing_subscriber::EnvFilter;

/// Manage a local todo list and sync it with a remote service.
#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the item file
    #[arg(global = true, short, long, env = "TODO_DIR", default_value = ".")]
    dir: PathBuf,

    /// Item file name; `.json` or `.csv` selects the format
    #[arg(global = true, short, long, default_value = "todo_items.json")]
    file: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show items in creation order
    List {
        /// Include completed items
        #[arg(short, long)]
        all: bool,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create an item
    Add {
        /// Item text
        text: String,

        /// Importance (low, basic, important)
        #[arg(short, long, default_value = "basic")]
        importance: Importance,

        /// Deadline, seconds since the Unix epoch
        #[arg(long)]
        deadline: Option<i64>,

        /// Color tag, e.g. #FF0000
        #[arg(long)]
        color: Option<String>,
    },

    /// Mark an item done
    Done {
        /// Item id
        id: String,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete an item
    Remove {
        /// Item id
        id: String,
    },

    /// Replace the list with the contents of a file
    Import {
        /// Source file (.json or .csv)
        path: PathBuf,
    },

    /// Write the list to a file
    Export {
        /// Destination file (.json or .csv)
        path: PathBuf,
    },

    /// Sync with the remote service
    Sync {
        /// Base URL of the service
        #[arg(long, env = "TODO_BASE_URL")]
        base_url: String,

        /// Bearer token
        #[arg(long, env = "TODO_TOKEN", hide_env_values = true)]
        token: String,

        /// Device id reported with pushed changes
        #[arg(long, default_value = "todo-cli")]
        device_id: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG overrides the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = StoreConfig::new().directory(&cli.dir).file_name(&cli.file);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::List { all, format } => {
            commands::items::list(&config, all, &format, &mut out)?;
        }
        Commands::Add {
            text,
            importance,
            deadline,
            color,
        } => {
            let item = commands::items::add(&config, &text, importance, deadline, color)?;
            commands::items::print_item(&item, &mut out)?;
        }
        Commands::Done { id, undo } => {
            let item = commands::items::set_done(&config, &id, !undo)?;
            commands::items::print_item(&item, &mut out)?;
        }
        Commands::Remove { id } => {
            let item = commands::items::remove(&config, &id)?;
            commands::items::print_item(&item, &mut out)?;
        }
        Commands::Import { path } => {
            let count = commands::transfer::import(&config, &path)?;
            writeln!(out, "Imported {count} items from {}", path.display())?;
        }
        Commands::Export { path } => {
            let count = commands::transfer::export(&config, &path)?;
            writeln!(out, "Exported {count} items to {}", path.display())?;
        }
        Commands::Sync {
            base_url,
            token,
            device_id,
            format,
        } => {
            commands::sync::run(&config, base_url, token, device_id, &format, &mut out)?;
        }
    }

    Ok(())
}
