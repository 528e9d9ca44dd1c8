//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

/// Sync Telegram channel statistics into Notion
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "stratosphere-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run the configuration checks and exit
    #[arg(long)]
    pub check: bool,
}
