//! Current/previous metrics to dated rows.
//!
//! The statistics API reports a value for "now" and one for "a week ago"
//! without dating either. Rows are dated from the run date: `today` for
//! `current` and `today - 7 days` for `previous`.

use crate::model::{MetricRow, StateKey};
use chrono::{Days, NaiveDate};
use serde_json::Value;
use stratosphere_common::{Result, StratosphereError};

/// Days between the `current` and `previous` observations.
pub const PREVIOUS_OFFSET_DAYS: u64 = 7;

/// Converts one `StatsAbsValueAndPrev` value into its two dated rows,
/// `[today, today - 7 days]`.
pub fn transform_state_metric(key: StateKey, value: &Value, today: NaiveDate) -> Result<[MetricRow; 2]> {
    let current = numeric_field(key, value, "current")?;
    let previous = numeric_field(key, value, "previous")?;

    let week_ago = today
        .checked_sub_days(Days::new(PREVIOUS_OFFSET_DAYS))
        .ok_or_else(|| StratosphereError::contract(format!("Run date {} is out of range", today)))?;

    Ok([
        MetricRow {
            date: today,
            key,
            display_name: key.display_name(),
            value: current,
        },
        MetricRow {
            date: week_ago,
            key,
            display_name: key.display_name(),
            value: previous,
        },
    ])
}

fn numeric_field(key: StateKey, value: &Value, field: &str) -> Result<f64> {
    match value.get(field) {
        Some(v) => v.as_f64().ok_or_else(|| {
            StratosphereError::contract_field(format!("Metric '{}' has a non-numeric '{}' value", key, field), field)
        }),
        None => Err(StratosphereError::contract_field(
            format!("Metric '{}' is missing its '{}' value", key, field),
            field,
        )),
    }
}
