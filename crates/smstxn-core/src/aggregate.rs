//! Month-wise spend totals
//!
//! Transactions are bucketed by a `YYYY_MM` month key, then by currency.
//! The first time a month is touched, every known currency is seeded at zero
//! so a currency with no spend reports `0` instead of being missing.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::TransactionRecord;

/// `YYYY_MM` key for a transaction date
pub fn month_key(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y_%m").to_string()
}

/// Month key → currency → total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonthlyTotals(BTreeMap<String, BTreeMap<String, Decimal>>);

impl MonthlyTotals {
    pub fn get(&self, month: &str, currency: &str) -> Option<Decimal> {
        self.0
            .get(month)
            .and_then(|buckets| buckets.get(&currency.to_uppercase()))
            .copied()
    }

    pub fn month(&self, month: &str) -> Option<&BTreeMap<String, Decimal>> {
        self.0.get(month)
    }

    /// Month keys in chronological order
    pub fn months(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, Decimal>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Groups transactions by month and currency
#[derive(Debug, Clone)]
pub struct SpendAggregator {
    currencies: Vec<String>,
}

impl Default for SpendAggregator {
    fn default() -> Self {
        Self::new(["PKR", "USD", "CAD"])
    }
}

impl SpendAggregator {
    pub fn new<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            currencies: currencies
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.currencies)
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Fails with [`Error::InvalidData`] if a month's total overflows
    pub fn summarize_by_month(&self, transactions: &[TransactionRecord]) -> Result<MonthlyTotals> {
        let mut totals: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();

        for txn in transactions {
            let buckets = totals.entry(month_key(&txn.date())).or_insert_with(|| {
                self.currencies
                    .iter()
                    .map(|c| (c.clone(), Decimal::ZERO))
                    .collect()
            });

            let currency = txn.currency().to_uppercase();
            if !self.currencies.contains(&currency) {
                warn!(
                    "Unknown currency {} in transaction at {}, adding separate bucket",
                    currency,
                    txn.vendor()
                );
            }
            let total = buckets.entry(currency).or_insert(Decimal::ZERO);
            *total = total.checked_add(txn.amount()).ok_or_else(|| {
                Error::InvalidData(format!(
                    "{} total for {} overflows adding {}",
                    txn.currency(),
                    month_key(&txn.date()),
                    txn.amount()
                ))
            })?;
        }

        Ok(MonthlyTotals(totals))
    }

    /// Number of transactions per month key
    pub fn count_by_month(&self, transactions: &[TransactionRecord]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for txn in transactions {
            *counts.entry(month_key(&txn.date())).or_insert(0) += 1;
        }
        counts
    }
}
