//! Shared utility functions.

use crate::types::DateZone;
use chrono::{DateTime, NaiveDate};

/// Date format used on the wire (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a millisecond epoch timestamp to a calendar date in `zone`.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn epoch_millis_to_date(millis: i64, zone: &DateZone) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|instant| zone.date_of(instant))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Truncates a string to a maximum length with ellipsis.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
