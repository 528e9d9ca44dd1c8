//! Records uploaded to the destination tables and their column layout.

use chrono::NaiveDate;
use serde::Serialize;
use stratosphere_common::{Handle, RowFields, DATE_COLUMN, HANDLE_COLUMN};

/// Column names of the state table.
pub mod state_columns {
    pub use stratosphere_common::{DATE_COLUMN as DATE, HANDLE_COLUMN as HANDLE};

    /// Followers column
    pub const FOLLOWERS: &str = "Followers Per Post";
    /// Reactions column
    pub const REACTIONS: &str = "Reactions Per Post";
    /// Views column
    pub const VIEWS: &str = "Views Per Post";
    /// Shares column
    pub const SHARES: &str = "Shares Per Post";
}

/// Column names of the timeseries table.
pub mod timeseries_columns {
    pub use stratosphere_common::{DATE_COLUMN as DATE, HANDLE_COLUMN as HANDLE};

    /// Joined column
    pub const JOINED: &str = "Joined";
    /// Mute column
    pub const MUTE: &str = "Mute";
    /// Left column
    pub const LEFT: &str = "Left";
    /// Total followers column
    pub const FOLLOWERS: &str = "Total followers";
}

/// A row destined for one of the tables, keyed by `(handle, date)`.
pub trait UploadRecord {
    /// Row date.
    fn date(&self) -> NaiveDate;

    /// Channel the row belongs to.
    fn handle(&self) -> &Handle;

    /// Destination fields in column order.
    fn to_row_fields(&self) -> RowFields;
}

/// One dated snapshot of a channel's current/previous metrics.
///
/// Metrics the channel never reported are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRecord {
    /// Row date
    pub date: NaiveDate,
    /// Channel handle
    pub handle: Handle,
    /// `followers`
    pub followers: Option<f64>,
    /// `reactions_per_post`
    pub reactions: Option<f64>,
    /// `views_per_post`
    pub views: Option<f64>,
    /// `shares_per_post`
    pub shares: Option<f64>,
}

impl StateRecord {
    /// Empty record for `handle` on `date`.
    pub fn new(date: NaiveDate, handle: Handle) -> Self {
        Self {
            date,
            handle,
            followers: None,
            reactions: None,
            views: None,
            shares: None,
        }
    }
}

impl UploadRecord for StateRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn handle(&self) -> &Handle {
        &self.handle
    }

    // Unreported metrics go out as 0.
    fn to_row_fields(&self) -> RowFields {
        RowFields::new()
            .date(DATE_COLUMN, self.date)
            .title(HANDLE_COLUMN, self.handle.as_str())
            .number(state_columns::FOLLOWERS, self.followers.unwrap_or_default())
            .number(state_columns::REACTIONS, self.reactions.unwrap_or_default())
            .number(state_columns::VIEWS, self.views.unwrap_or_default())
            .number(state_columns::SHARES, self.shares.unwrap_or_default())
    }
}

/// One day of a channel's graph series, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesRecord {
    /// Row date
    pub date: NaiveDate,
    /// Channel handle
    pub handle: Handle,
    /// Followers joined that day
    pub joined: f64,
    /// Followers who muted that day
    pub mute: f64,
    /// Followers who left that day
    pub left: f64,
    /// Total followers at that day
    pub followers: f64,
}

impl TimeseriesRecord {
    /// Zeroed record for `handle` on `date`.
    pub fn new(date: NaiveDate, handle: Handle) -> Self {
        Self {
            date,
            handle,
            joined: 0.0,
            mute: 0.0,
            left: 0.0,
            followers: 0.0,
        }
    }
}

impl UploadRecord for TimeseriesRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn handle(&self) -> &Handle {
        &self.handle
    }

    fn to_row_fields(&self) -> RowFields {
        RowFields::new()
            .date(DATE_COLUMN, self.date)
            .title(HANDLE_COLUMN, self.handle.as_str())
            .number(timeseries_columns::JOINED, self.joined)
            .number(timeseries_columns::MUTE, self.mute)
            .number(timeseries_columns::LEFT, self.left)
            .number(timeseries_columns::FOLLOWERS, self.followers)
    }
}
