//! Common type definitions and newtype wrappers for domain modeling.

use crate::error::{Result, StratosphereError};
use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Raw statistics object as returned by the statistics source: field name to
/// tagged value.
pub type StatsObject = serde_json::Map<String, serde_json::Value>;

/// Destination column holding the channel handle (the row title).
pub const HANDLE_COLUMN: &str = "Handle";

/// Destination column holding the row date.
pub const DATE_COLUMN: &str = "Date";

/// Human-readable channel identifier, used as the upload key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Creates a handle, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StratosphereError::contract_field(
                "Channel handle cannot be empty",
                "handle",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a value without validation. Blank handles are caught again at
    /// upload time.
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the handle is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a destination table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub String);

impl TableId {
    /// Creates a table identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed cell value sent to the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Numeric cell
    Number(f64),
    /// Calendar date cell
    Date(NaiveDate),
    /// Title (text) cell
    Title(String),
}

/// Ordered mapping of destination column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFields {
    fields: Vec<(String, FieldValue)>,
}

impl RowFields {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a numeric column.
    pub fn number(mut self, column: impl Into<String>, value: f64) -> Self {
        self.fields.push((column.into(), FieldValue::Number(value)));
        self
    }

    /// Appends a date column.
    pub fn date(mut self, column: impl Into<String>, value: NaiveDate) -> Self {
        self.fields.push((column.into(), FieldValue::Date(value)));
        self
    }

    /// Appends a title column.
    pub fn title(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((column.into(), FieldValue::Title(value.into())));
        self
    }

    /// Looks a column up by name.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterates over columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Zone used to turn instants into calendar dates.
///
/// The statistics API hands out bare epoch timestamps; which calendar day
/// they belong to depends on this choice. UTC is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateZone {
    /// Coordinated Universal Time
    #[default]
    Utc,
    /// Zone of the running process
    Local,
    /// Named IANA zone
    Named(Tz),
}

impl DateZone {
    /// Calendar date of an instant in this zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Utc => instant.date_naive(),
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    /// Current calendar date in this zone.
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

impl FromStr for DateZone {
    type Err = StratosphereError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::Utc);
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|e| StratosphereError::config(format!("Unknown timezone '{}': {}", trimmed, e)))
    }
}

impl fmt::Display for DateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("UTC"),
            Self::Local => f.write_str("local"),
            Self::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}
