//! Institution configuration
//!
//! Holds the sender short codes for each institution, the currencies every
//! monthly bucket starts with, and the UTC offset used for notification dates.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-step resolution:
//! 1. An explicit path (the CLI's `--config`), which must exist
//! 2. The override in the data dir (~/.local/share/smstxn/config/institutions.toml)
//! 3. The embedded defaults (compiled into the binary)

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Institution;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/institutions.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Short codes per institution
    pub short_codes: BTreeMap<Institution, Vec<String>>,
    /// Currencies pre-seeded (at zero) in every month bucket
    pub currencies: Vec<String>,
    /// Offset of the banks' local time from UTC
    pub utc_offset_minutes: i32,
}

impl Default for Config {
    fn default() -> Self {
        let mut short_codes = BTreeMap::new();
        short_codes.insert(Institution::Hbl, vec!["4250".to_string()]);
        short_codes.insert(Institution::Fbl, vec!["8756".to_string()]);
        short_codes.insert(Institution::Scb, vec!["7220".to_string()]);
        short_codes.insert(
            Institution::Mezn,
            vec!["8079".to_string(), "9779".to_string()],
        );

        Self {
            short_codes,
            currencies: vec!["PKR".to_string(), "USD".to_string(), "CAD".to_string()],
            utc_offset_minutes: 5 * 60,
        }
    }
}

impl Config {
    /// Load configuration (explicit path, then data dir override, then embedded default)
    ///
    /// An explicit path must exist.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "Config file {} not found",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                return Self::from_file(&default_path);
            }
        }

        parse_config(DEFAULT_CONFIG)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        parse_config(&content)
    }

    /// The banks' local timezone as a fixed offset
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            Error::Config(format!(
                "UTC offset out of range: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("smstxn")
            .join("config")
            .join("institutions.toml")
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    institutions: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    currencies: Option<Vec<String>>,
    utc_offset_minutes: Option<i32>,
}

/// Parse config from TOML content, layered over [`Config::default`]
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(defaults) = raw.defaults {
        if let Some(currencies) = defaults.currencies {
            config.currencies = currencies
                .iter()
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(offset) = defaults.utc_offset_minutes {
            config.utc_offset_minutes = offset;
        }
    }

    if let Some(institutions) = raw.institutions {
        for (name, codes) in institutions {
            let institution = match name.parse::<Institution>() {
                Ok(Institution::Other) | Err(_) => {
                    warn!("Skipping unknown institution in config: {}", name);
                    continue;
                }
                Ok(institution) => institution,
            };
            config.short_codes.insert(institution, codes);
        }
    }

    // A short code must map to exactly one institution
    let mut owners: HashMap<&str, Institution> = HashMap::new();
    for (institution, codes) in &config.short_codes {
        for code in codes {
            if let Some(previous) = owners.insert(code.as_str(), *institution) {
                return Err(Error::Config(format!(
                    "Short code {} assigned to both {} and {}",
                    code, previous, institution
                )));
            }
        }
    }

    config.utc_offset()?;

    Ok(config)
}
