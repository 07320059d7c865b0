// ABOUTME: Implementation of 'analytics ack' command
// ABOUTME: Performs a connection acknowledgement and prints the instance id

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let client = settings.builder().connect().await?;

    let response = client.connection_ack().await;
    let ack = match response.into_result() {
        Ok(ack) => ack,
        Err(status) => bail!(
            "ConnectionAck failed ({:?}): {}",
            status.code(),
            status.message()
        ),
    };

    println!("{}", "Connection".bold());
    println!("  {}:    {}", "Target".dimmed(), client.channel().target());
    println!(
        "  {}: {}",
        "Connected".dimmed(),
        if ack.connected {
            "yes".green()
        } else {
            "no".red()
        }
    );
    println!(
        "  {}:  {}",
        "Instance".dimmed(),
        if ack.instance_uuid.is_empty() {
            "(unknown)".dimmed().to_string()
        } else {
            ack.instance_uuid
        }
    );

    Ok(())
}
