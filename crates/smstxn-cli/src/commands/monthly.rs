//! Month-wise spend report

use anyhow::{Context, Result};
use serde_json::json;
use smstxn_core::{Config, ParseSummary, SpendAggregator};

pub fn cmd_monthly(summary: &ParseSummary, config: &Config, json: bool) -> Result<()> {
    let aggregator = SpendAggregator::from_config(config);
    let totals = aggregator
        .summarize_by_month(summary.transactions())
        .context("Failed to compute monthly totals")?;
    let counts = aggregator.count_by_month(summary.transactions());

    if json {
        let out = serde_json::to_string_pretty(&json!({
            "totals": totals,
            "counts": counts,
        }))
        .context("Failed to serialize monthly totals to JSON")?;
        println!("{}", out);
        return Ok(());
    }

    if totals.is_empty() {
        println!("No card transactions found in {}.", summary.source());
        return Ok(());
    }

    println!();
    println!("📅 Monthly Spend");
    println!("   ─────────────────────────────────────────────────────────────");

    for (month, buckets) in totals.iter() {
        let count = counts.get(month).copied().unwrap_or(0);
        println!("   {} ({} transactions)", month, count);
        for (currency, total) in buckets {
            println!("      {:<4} {:>14.2}", currency, total);
        }
    }

    Ok(())
}
