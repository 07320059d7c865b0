// ABOUTME: Implementation of 'analytics stats' command
// ABOUTME: Retrieves the stats snapshot and prints it as text or JSON

use analytics_client::StatsSnapshot;
use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::config::Settings;

pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    let client = settings.builder().connect().await?;

    let snapshot = match client.receive_stats().await.into_result() {
        Ok(stats) => StatsSnapshot::from(stats),
        Err(status) => bail!(
            "RetrieveStats failed ({:?}): {}",
            status.code(),
            status.message()
        ),
    };

    if json {
        let out = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{}", out);
        return Ok(());
    }

    print!("{}", render(&snapshot));
    Ok(())
}

/// Human-readable rendering of a snapshot.
pub fn render(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();
    let date = snapshot
        .snapshot_date
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "(unknown)".to_string());

    out.push_str(&format!("{}\n", "Stats".bold()));
    out.push_str(&format!(
        "  {}:  {} {}\n",
        "Product".dimmed(),
        snapshot.product,
        snapshot.version
    ));
    out.push_str(&format!("  {}:   {}\n", "Vendor".dimmed(), snapshot.vendor));
    out.push_str(&format!("  {}:   {}\n", "Commit".dimmed(), snapshot.commit_sha));
    out.push_str(&format!("  {}:    {}\n", "Built".dimmed(), snapshot.build_date));
    out.push_str(&format!(
        "  {}:  {}\n",
        "Flavour".dimmed(),
        snapshot.build_flavour.as_str_name().to_lowercase()
    ));
    out.push_str(&format!("  {}: {}\n", "Snapshot".dimmed(), date));

    if !snapshot.data.is_empty() {
        out.push_str(&format!("\n{}\n", "Data".bold()));
        for (key, value) in &snapshot.data {
            out.push_str(&format!("  {}: {}\n", key.dimmed(), value));
        }
    }

    out
}
