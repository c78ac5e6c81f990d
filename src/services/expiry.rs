use chrono::{Datelike, NaiveDate, Utc};

use crate::error::OptWatchError;

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Resolve a bare month name to the next `MMM-YY` contract expiry.
///
/// Input is case-insensitive and truncated to three letters, so "june"
/// works. A month at or after the current one lands in the current year,
/// anything earlier rolls over to the next.
pub fn normalize(raw: &str, today: NaiveDate) -> Result<String, OptWatchError> {
    let token: String = raw.trim().to_uppercase().chars().take(3).collect();

    let month = MONTHS
        .iter()
        .position(|m| *m == token)
        .ok_or_else(|| OptWatchError::InvalidExpiry(raw.trim().to_string()))?
        as u32
        + 1;

    let current_month = today.month();
    let current_year = today.year() % 100;

    let year = if month >= current_month {
        current_year
    } else {
        current_year + 1
    };

    Ok(format!("{token}-{year:02}"))
}

pub fn normalize_today(raw: &str) -> Result<String, OptWatchError> {
    normalize(raw, Utc::now().date_naive())
}
