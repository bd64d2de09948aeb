//! smstxn Core Library
//!
//! Extracts credit-card transactions from a phone's SMS backup:
//! - Backup loading (XML export) and the single-pass scan
//! - Sender classification by bank short code
//! - Content-hash deduplication of message bodies
//! - Per-bank notification templates (HBL built in)
//! - Month-wise spend totals by currency

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod models;
pub mod sms_backup;

pub use aggregate::{month_key, MonthlyTotals, SpendAggregator};
pub use classify::MessageClassifier;
pub use config::Config;
pub use dedup::{DedupKey, DeduplicationIndex};
pub use error::{Error, ExtractionFailure, Result};
pub use extract::{HblTemplate, TemplateRegistry, TransactionTemplate};
pub use models::{
    ClassificationResult, Institution, InstitutionCounts, MessageDiagnostic, MessageKind,
    MoneyAmount, RawMessage, TransactionRecord,
};
pub use sms_backup::{BackupFileParser, CountMismatch, LoadedBackup, ParseSummary};
