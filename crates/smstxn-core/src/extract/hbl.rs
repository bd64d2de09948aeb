//! HBL credit-card notification template
//!
//! Example body:
//! `Dear Customer, Your HBL CreditCard (ending with 8526) has been charged at
//! IMTIAZ SUPER MARKET for PKR-25,170.49 on 01/Oct/2023.`

use chrono::FixedOffset;
use regex::Regex;
use tracing::{debug, warn};

use super::amount::parse_amount;
use super::date::{parse_date, HBL_DATE_FORMAT};
use super::TransactionTemplate;
use crate::error::{ExtractionFailure, Result};
use crate::models::{Institution, RawMessage, TransactionRecord};

const HBL_CC_TXN_RE: &str = r"^Dear Customer, Your HBL CreditCard \(ending with (?P<last4>\d{4})\) has been charged at (?P<vendor>.*) for (?P<amount>.*) on (?P<date>.*)";

pub struct HblTemplate {
    pattern: Regex,
    offset: FixedOffset,
}

impl HblTemplate {
    pub fn new(offset: FixedOffset) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(HBL_CC_TXN_RE)?,
            offset,
        })
    }
}

impl TransactionTemplate for HblTemplate {
    fn institution(&self) -> Institution {
        Institution::Hbl
    }

    fn is_notification(&self, body: &str) -> bool {
        body.contains("CreditCard") && body.contains("has been charged at")
    }

    fn extract(&self, message: &RawMessage) -> std::result::Result<TransactionRecord, ExtractionFailure> {
        let caps = self.pattern.captures(&message.body).ok_or_else(|| {
            warn!("Unable to match HBL template against SMS body: {}", message.body);
            ExtractionFailure::TemplateMismatch {
                institution: Institution::Hbl.to_string(),
                body: message.body.clone(),
            }
        })?;

        // Every field parser runs; the first failure is returned at the gate below
        let mut failures = Vec::new();

        let last4 = caps["last4"].trim();
        let card_last_four = match last4.parse::<u16>() {
            Ok(digits) => Some(digits),
            Err(_) => {
                failures.push(ExtractionFailure::DigitsParseError(last4.to_string()));
                None
            }
        };

        let vendor = caps["vendor"].trim();

        let money = match parse_amount(&caps["amount"]) {
            Ok(money) => Some(money),
            Err(failure) => {
                failures.push(failure);
                None
            }
        };

        let date_token = caps["date"].trim().trim_end_matches('.');
        let date = match parse_date(date_token, HBL_DATE_FORMAT, self.offset) {
            Ok(date) => Some(date),
            Err(failure) => {
                failures.push(failure);
                None
            }
        };

        let (Some(money), Some(date), Some(card_last_four)) = (money, date, card_last_four) else {
            for failure in &failures {
                debug!("HBL field failure: {}", failure);
            }
            return Err(failures
                .into_iter()
                .next()
                .unwrap_or_else(|| ExtractionFailure::Invalid("incomplete HBL record".into())));
        };

        TransactionRecord::new(money, date, vendor, card_last_four, Institution::Hbl)
            .map(|record| record.with_received_at(message.received_at()))
    }
}
