//! Scan summary: per-institution counts, declared vs. found, diagnostics

use anyhow::Result;
use smstxn_core::{Institution, ParseSummary};

pub fn cmd_summary(summary: &ParseSummary) -> Result<()> {
    let counts = summary.counts();

    println!();
    println!("📊 Backup Summary");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   File: {}", summary.source());
    println!("   Declared count: {}", summary.declared_count());
    println!("   Message nodes:  {}", summary.message_nodes());
    if summary.mms_skipped() > 0 {
        println!("   MMS skipped:    {}", summary.mms_skipped());
    }

    if let Some(mismatch) = summary.count_mismatch() {
        println!(
            "   ⚠️  Declared {} messages but found {}",
            mismatch.declared, mismatch.found
        );
    }

    println!();
    println!("   {:<8} {:>8}", "ALL", counts.all);
    for institution in Institution::known()
        .iter()
        .copied()
        .chain(std::iter::once(Institution::Other))
    {
        println!("   {:<8} {:>8}", institution.as_str(), counts.get(institution));
    }

    println!();
    println!("   Transactions: {}", summary.transactions().len());
    println!("   Vendors:      {}", summary.vendors().len());

    let duplicates = summary.duplicate_count();
    if duplicates > 0 {
        println!("   👯 Duplicates: {}", duplicates);
    }

    let failures = summary.failure_counts();
    if !failures.is_empty() {
        println!();
        println!("   ⚠️  Extraction failures:");
        for (kind, count) in &failures {
            println!("      {:<20} {}", kind, count);
        }
        println!("      Run with --verbose to see each message.");
    }

    Ok(())
}
