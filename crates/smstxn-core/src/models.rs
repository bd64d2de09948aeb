//! Domain models for smstxn

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionFailure;

/// Sending institution, inferred from the sender short code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Institution {
    /// Habib Bank Limited
    Hbl,
    /// Faysal Bank Limited
    Fbl,
    /// Standard Chartered Bank
    Scb,
    /// Meezan Bank
    Mezn,
    /// Any sender not in a known short-code set
    Other,
}

impl Institution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hbl => "HBL",
            Self::Fbl => "FBL",
            Self::Scb => "SCB",
            Self::Mezn => "MEZN",
            Self::Other => "OTHER",
        }
    }

    /// Every tag except `Other`
    pub fn known() -> &'static [Institution] {
        &[Self::Hbl, Self::Fbl, Self::Scb, Self::Mezn]
    }
}

impl std::str::FromStr for Institution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HBL" => Ok(Self::Hbl),
            "FBL" => Ok(Self::Fbl),
            "SCB" => Ok(Self::Scb),
            "MEZN" | "MEEZAN" => Ok(Self::Mezn),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown institution: {}", s)),
        }
    }
}

impl std::fmt::Display for Institution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of backup entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Sms,
    /// Multimedia messages are never classified or counted
    Mms,
}

/// One message as read from the backup file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawMessage {
    /// Sender short code or phone number
    pub address: String,
    pub body: String,
    /// Received time in epoch millis (phone-supplied, not authoritative)
    pub date: Option<i64>,
    /// Sent time in epoch millis
    pub date_sent: Option<i64>,
    pub kind: MessageKind,
}

impl RawMessage {
    pub fn sms(address: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            body: body.into(),
            date: None,
            date_sent: None,
            kind: MessageKind::Sms,
        }
    }

    pub fn with_date(mut self, date: i64) -> Self {
        self.date = Some(date);
        self
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(DateTime::from_timestamp_millis)
    }
}

/// A positive amount in a named currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyAmount {
    currency: String,
    amount: Decimal,
}

impl MoneyAmount {
    /// Rejects an empty currency code and non-positive amounts
    pub fn new(currency: impl Into<String>, amount: Decimal) -> Result<Self, ExtractionFailure> {
        let currency = currency.into().trim().to_string();
        if currency.is_empty() {
            return Err(ExtractionFailure::Invalid("empty currency code".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(ExtractionFailure::Invalid(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        Ok(Self { currency, amount })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl std::fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// A credit-card transaction extracted from a bank notification
///
/// Only constructed through [`TransactionRecord::new`], which enforces that
/// the vendor is non-empty and the card digits are in `1..=9999`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    money: MoneyAmount,
    date: DateTime<FixedOffset>,
    vendor: String,
    card_last_four: u16,
    institution: Institution,
    received_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    pub fn new(
        money: MoneyAmount,
        date: DateTime<FixedOffset>,
        vendor: &str,
        card_last_four: u16,
        institution: Institution,
    ) -> Result<Self, ExtractionFailure> {
        let vendor = vendor.trim();
        if vendor.is_empty() {
            return Err(ExtractionFailure::Invalid("empty vendor".into()));
        }
        if card_last_four == 0 || card_last_four > 9999 {
            return Err(ExtractionFailure::Invalid(format!(
                "card digits out of range: {}",
                card_last_four
            )));
        }
        Ok(Self {
            money,
            date,
            vendor: vendor.to_string(),
            card_last_four,
            institution,
            received_at: None,
        })
    }

    /// Attach the phone's receive time of the source message
    pub fn with_received_at(mut self, received_at: Option<DateTime<Utc>>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn money(&self) -> &MoneyAmount {
        &self.money
    }

    pub fn currency(&self) -> &str {
        self.money.currency()
    }

    pub fn amount(&self) -> Decimal {
        self.money.amount()
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn card_last_four(&self) -> u16 {
        self.card_last_four
    }

    pub fn institution(&self) -> Institution {
        self.institution
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }
}

impl std::fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CC Txn: {} at {} on {}",
            self.money,
            self.vendor,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Outcome of classifying a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub institution: Institution,
    /// Body passed the institution's cheap notification pre-filter
    pub is_transaction_notification: bool,
}

/// Message tallies for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstitutionCounts {
    /// Every non-MMS message, duplicates included
    pub all: usize,
    pub by_institution: BTreeMap<Institution, usize>,
}

impl InstitutionCounts {
    pub fn get(&self, institution: Institution) -> usize {
        self.by_institution.get(&institution).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, institution: Institution) {
        *self.by_institution.entry(institution).or_insert(0) += 1;
    }
}

/// Something worth reporting about a single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageDiagnostic {
    /// Body digest already seen earlier in the scan
    Duplicate {
        position: usize,
        institution: Institution,
        address: String,
        body: String,
        original_body: String,
    },
    /// Passed the pre-filter but no record came out
    Extraction {
        position: usize,
        institution: Institution,
        failure: String,
        failure_kind: String,
    },
}
