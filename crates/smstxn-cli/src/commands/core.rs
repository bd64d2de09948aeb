//! Shared utilities for loading config and scanning the backup

use std::path::Path;

use anyhow::{Context, Result};
use smstxn_core::{BackupFileParser, Config, ParseSummary};
use tracing::debug;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load institution config")
}

/// Load the backup file and run the single scan every command reads from
pub fn load_summary(file: &Path, config: &Config) -> Result<ParseSummary> {
    let parser =
        BackupFileParser::from_config(config).context("Failed to build message classifier")?;
    let loaded = parser
        .load(file)
        .with_context(|| format!("Failed to load SMS backup {}", file.display()))?;

    debug!(
        "Loaded {} message nodes from {}",
        loaded.messages().len(),
        loaded.source()
    );

    Ok(loaded.parse_all())
}
