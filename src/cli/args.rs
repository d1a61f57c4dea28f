//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const QUICK_START: &str = "Quick Start:
  $ watchlist add ~/projects ~/notes   # Watch two folders
  $ watchlist list                      # Show watched folders
  $ watchlist remove ~/notes            # Stop watching a folder
  $ watchlist check                     # Report folders that disappeared
  $ watchlist prune                     # Forget folders that disappeared";

/// Watched folder registry
#[derive(Parser)]
#[command(
    name = "watchlist",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage the folders a backend watches for changes",
    after_help = QUICK_START,
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true, env = "WATCHLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit JSON envelopes instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default settings file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Start watching one or more folders
    #[command(visible_alias = "add-dir")]
    Add {
        /// Folders to watch (`~` is expanded)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Stop watching a folder
    #[command(visible_alias = "remove-dir")]
    Remove {
        /// Folder to stop watching
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// List watched folders in the order they were added
    #[command(visible_alias = "list-dirs")]
    List,

    /// Report watched folders that no longer exist
    Check,

    /// Forget watched folders that no longer exist
    Prune,

    /// Display active settings
    Config,
}
