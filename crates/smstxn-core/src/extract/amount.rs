//! Currency + amount tokens such as `PKR-25,170.49`

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ExtractionFailure;
use crate::models::MoneyAmount;

fn amount_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<currency>[^\s\-\d]+)-(?P<amount>\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})$",
        )
        .expect("valid regex")
    })
}

/// Parse a `<currency>-<amount>` token into a [`MoneyAmount`]
///
/// The amount has exactly two decimal places and either no grouping or
/// comma thousands separators in groups of three (`25,170.49`, `15134.00`).
/// The currency code is taken verbatim; checking it against a known set is
/// left to callers.
pub fn parse_amount(token: &str) -> Result<MoneyAmount, ExtractionFailure> {
    let token = token.trim();
    let caps = amount_token_re()
        .captures(token)
        .ok_or_else(|| ExtractionFailure::AmountParseError(token.to_string()))?;

    let currency = &caps["currency"];
    let amount = Decimal::from_str(&caps["amount"].replace(',', ""))
        .map_err(|e| ExtractionFailure::AmountParseError(format!("{} ({})", token, e)))?;

    MoneyAmount::new(currency, amount).map_err(|e| match e {
        ExtractionFailure::Invalid(reason) => {
            ExtractionFailure::AmountParseError(format!("{} ({})", token, reason))
        }
        other => other,
    })
}
