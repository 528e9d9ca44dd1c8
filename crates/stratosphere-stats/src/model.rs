//! Metric keys, type tags and the rows produced by the transformers.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Key of the type discriminator embedded in every statistics value.
pub const TYPE_KEY: &str = "_";

/// Discriminator of current/previous values.
pub const ABS_VALUE_TAG: &str = "StatsAbsValueAndPrev";

/// Discriminator of fully loaded graphs.
pub const GRAPH_TAG: &str = "StatsGraph";

/// Current/previous metrics copied into the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKey {
    /// `followers`
    Followers,
    /// `views_per_post`
    ViewsPerPost,
    /// `shares_per_post`
    SharesPerPost,
    /// `reactions_per_post`
    ReactionsPerPost,
}

impl StateKey {
    /// Every supported state metric.
    pub const ALL: [StateKey; 4] = [
        StateKey::Followers,
        StateKey::ViewsPerPost,
        StateKey::SharesPerPost,
        StateKey::ReactionsPerPost,
    ];

    /// Field name in the statistics object.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::ViewsPerPost => "views_per_post",
            Self::SharesPerPost => "shares_per_post",
            Self::ReactionsPerPost => "reactions_per_post",
        }
    }

    /// Human-readable metric name carried on state rows.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Followers => "Followers",
            Self::ViewsPerPost => "Views per Post",
            Self::SharesPerPost => "Shares per Post",
            Self::ReactionsPerPost => "Reactions per Post",
        }
    }

    /// Looks up a supported field name.
    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.field_name() == name)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Graphs copied into the timeseries table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKey {
    /// `growth_graph`, total followers per day
    Growth,
    /// `followers_graph`, joined and left per day
    Followers,
    /// `mute_graph`, muted per day
    Mute,
}

impl GraphKey {
    /// Every supported graph.
    pub const ALL: [GraphKey; 3] = [GraphKey::Growth, GraphKey::Followers, GraphKey::Mute];

    /// Field name in the statistics object.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Growth => "growth_graph",
            Self::Followers => "followers_graph",
            Self::Mute => "mute_graph",
        }
    }

    /// Looks up a supported field name.
    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.field_name() == name)
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One dated value of a current/previous metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    /// Run date or run date minus seven days
    pub date: NaiveDate,
    /// Metric the value belongs to
    pub key: StateKey,
    /// Display name of the metric
    pub display_name: &'static str,
    /// Observed value
    pub value: f64,
}

/// One decoded (day, series) point of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRow {
    /// Day of the x-axis entry
    pub date: NaiveDate,
    /// Legend name of the series
    pub display_name: String,
    /// Series value on that day
    pub value: f64,
}
