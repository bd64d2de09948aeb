//! Vendor listing

use anyhow::Result;
use smstxn_core::ParseSummary;

pub fn cmd_vendors(summary: &ParseSummary) -> Result<()> {
    let vendors = summary.vendors();

    if vendors.is_empty() {
        println!("No vendors found in {}.", summary.source());
        return Ok(());
    }

    println!();
    println!("🏪 Vendors ({})", vendors.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for (i, vendor) in vendors.iter().enumerate() {
        println!("   {:>3}. {}", i + 1, vendor);
    }

    Ok(())
}
