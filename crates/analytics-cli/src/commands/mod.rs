// ABOUTME: CLI command definitions using clap
// ABOUTME: Defines global connection flags and the ack and stats subcommands

use clap::{Parser, Subcommand};

pub mod ack;
pub mod stats;

#[derive(Parser, Debug)]
#[command(name = "analytics", version, about = "Query Noelware analytics endpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Server address (e.g., localhost:10234 or https://analytics.example.com)
    #[arg(long, global = true, env = "ANALYTICS_TARGET")]
    pub target: Option<String>,

    /// Port to use with a bare host given in --target
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Base64 service token issued by the instance
    #[arg(long, global = true, env = "ANALYTICS_SERVICE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log debug output from the client
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Check that the server accepts analytics connections
    Ack,

    /// Show the server's stats snapshot
    Stats {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}
