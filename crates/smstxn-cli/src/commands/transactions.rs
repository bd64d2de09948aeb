//! Transaction listing

use anyhow::{Context, Result};
use smstxn_core::ParseSummary;

use super::truncate;

pub fn cmd_transactions(summary: &ParseSummary, json: bool) -> Result<()> {
    let transactions = summary.transactions();

    if json {
        let out = serde_json::to_string_pretty(transactions)
            .context("Failed to serialize transactions to JSON")?;
        println!("{}", out);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No card transactions found in {}.", summary.source());
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({})", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for txn in transactions {
        println!(
            "   {} │ {} │ {:>3} {:>12.2} │ ****{:04} │ {}",
            txn.date().format("%Y-%m-%d"),
            txn.institution(),
            txn.currency(),
            txn.amount(),
            txn.card_last_four(),
            truncate(txn.vendor(), 32)
        );
    }

    Ok(())
}
