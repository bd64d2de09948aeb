//! Bank date tokens such as `01/Oct/2023`

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::ExtractionFailure;

/// Date format used in HBL credit-card notifications
pub const HBL_DATE_FORMAT: &str = "%d/%b/%Y";

/// Parse a date token strictly against `format`, anchored at local midnight
///
/// The token must re-render to exactly itself, so unpadded days or a
/// differently-cased month name are rejected along with impossible dates.
pub fn parse_date(
    token: &str,
    format: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ExtractionFailure> {
    let date = NaiveDate::parse_from_str(token, format)
        .map_err(|e| ExtractionFailure::DateParseError(format!("{} ({})", token, e)))?;

    if date.format(format).to_string() != token {
        return Err(ExtractionFailure::DateParseError(format!(
            "{} (does not match {})",
            token, format
        )));
    }

    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .ok_or_else(|| ExtractionFailure::DateParseError(token.to_string()))
}
