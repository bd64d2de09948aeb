//! Error types for smstxn

use thiserror::Error;

/// File-level errors. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Per-message failures. These are reported and the scan moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("Body does not match the {institution} template: {body}")]
    TemplateMismatch { institution: String, body: String },

    #[error("Unable to parse amount: {0}")]
    AmountParseError(String),

    #[error("Unable to parse date: {0}")]
    DateParseError(String),

    #[error("Unable to parse card digits: {0}")]
    DigitsParseError(String),

    #[error("Invalid transaction: {0}")]
    Invalid(String),
}

impl ExtractionFailure {
    /// Short machine-friendly name, used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TemplateMismatch { .. } => "template_mismatch",
            Self::AmountParseError(_) => "amount_parse_error",
            Self::DateParseError(_) => "date_parse_error",
            Self::DigitsParseError(_) => "digits_parse_error",
            Self::Invalid(_) => "invalid",
        }
    }
}
