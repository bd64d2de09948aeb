//! CLI command implementations
//!
//! Every command works on a [`ParseSummary`] produced by one scan of the backup:
//! - `core` - Shared utilities (config + backup loading)
//! - `vendors` - Distinct vendor listing
//! - `transactions` - Transaction listing (table or JSON)
//! - `monthly` - Month-wise totals per currency
//! - `summary` - Per-institution counts and diagnostics
//!
//! [`ParseSummary`]: smstxn_core::ParseSummary

pub mod core;
pub mod monthly;
pub mod summary;
pub mod transactions;
pub mod vendors;

// Re-export command functions for main.rs
pub use core::*;
pub use monthly::*;
pub use summary::*;
pub use transactions::*;
pub use vendors::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
