//! smstxn CLI - Credit-card spend from an SMS backup
//!
//! Usage:
//!   smstxn backup.xml vendors              Distinct vendors
//!   smstxn backup.xml transactions         Extracted transactions
//!   smstxn backup.xml monthly --json       Month-wise totals per currency
//!   smstxn backup.xml summary              Per-institution counts

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let summary = commands::load_summary(&cli.file, &config)?;

    match cli.command {
        Commands::Vendors => commands::cmd_vendors(&summary),
        Commands::Transactions { json } => commands::cmd_transactions(&summary, json),
        Commands::Monthly { json } => commands::cmd_monthly(&summary, &config, json),
        Commands::Summary => commands::cmd_summary(&summary),
    }
}
