// ABOUTME: Library exports for the analytics CLI
// ABOUTME: Resolves connection settings and dispatches commands

use anyhow::Result;

pub mod commands;
pub mod config;

pub use commands::{Cli, Command};
pub use config::{AnalyticsConfig, Settings};

/// Run a parsed command line.
pub async fn run_command(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.target, cli.port, cli.token, AnalyticsConfig::load());
    tracing::debug!(target_address = %settings.target, port = ?settings.port, "Resolved settings");

    match cli.command {
        Command::Ack => commands::ack::run(&settings).await,
        Command::Stats { json } => commands::stats::run(&settings, json).await,
    }
}
