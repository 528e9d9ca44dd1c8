//! Main entry point for the Stratosphere sync job.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use stratosphere_common::init_logging;
use stratosphere_config::ConfigLoader;
use stratosphere_sync::{build_orchestrator, Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("Running configuration checks");
    let config = ConfigLoader::load(cli.config.as_deref()).context("Configuration checks failed")?;
    println!("All configuration checks passed");

    let _guard = init_logging(config.logging.to_logging_config(cli.debug)).context("Failed to initialize logging")?;

    if cli.check {
        return Ok(());
    }

    info!("Starting Stratosphere sync");
    println!("Initializing clients");
    let mut orchestrator = build_orchestrator(&config)?.with_progress(channel_progress());

    match orchestrator.run().await {
        Ok(summary) => {
            println!("All channels processed");
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            error!("Sync failed: {}", e);
            Err(e.into())
        }
    }
}

fn channel_progress() -> ProgressBar {
    let progress = ProgressBar::new(0);
    if std::io::stdout().is_terminal() {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} channels {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
    } else {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }
    progress
}
