// ABOUTME: Entry point for the analytics CLI
// ABOUTME: Parses arguments, sets up logging, and dispatches to a command

use analytics_cli::commands::Cli;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.verbose {
        analytics_log::init_verbose();
    } else {
        analytics_log::init_for("analytics_cli");
    }

    analytics_cli::run_command(cli).await
}
