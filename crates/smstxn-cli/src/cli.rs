//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// smstxn - Credit-card spend from an SMS backup
#[derive(Parser)]
#[command(name = "smstxn")]
#[command(about = "Extract credit-card transactions from an SMS backup", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SMS backup XML file
    pub file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Institution config (short codes, currencies, UTC offset)
    ///
    /// Defaults to ~/.local/share/smstxn/config/institutions.toml when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List distinct vendors, sorted
    Vendors,

    /// List extracted transactions in backup order
    Transactions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Month-wise spend totals per currency
    Monthly {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-institution message counts and scan diagnostics
    Summary,
}
