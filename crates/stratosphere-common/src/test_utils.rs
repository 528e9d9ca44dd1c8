//! Test utilities and shared test helpers for Stratosphere.
//!
//! Fixtures for raw statistics payloads plus in-memory implementations of
//! the collaborator traits that record every call in order.

use crate::{
    error::{Result, StratosphereError},
    traits::{ChannelSource, RecordSink, StatsSource},
    types::{FieldValue, Handle, RowFields, StatsObject, TableId, DATE_COLUMN, HANDLE_COLUMN},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Once},
};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Builds a calendar date, panicking on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Raw statistics payload fixtures.
pub mod stats_fixtures {
    use serde_json::{json, Value};

    /// Milliseconds per day.
    pub const DAY_MS: i64 = 86_400_000;

    /// Midnight UTC of 2024-06-01 in milliseconds.
    pub const JUNE_FIRST_2024_MS: i64 = 1_717_200_000_000;

    /// A `StatsAbsValueAndPrev` value.
    pub fn abs_value(current: f64, previous: f64) -> Value {
        json!({ "_": "StatsAbsValueAndPrev", "current": current, "previous": previous })
    }

    /// A `StatsGraph` value wrapping the given columns and legend.
    pub fn graph(columns: Value, names: Value) -> Value {
        let data = json!({ "columns": columns, "names": names, "types": {} });
        json!({
            "_": "StatsGraph",
            "json": { "_": "DataJSON", "data": data.to_string() },
            "zoom_token": null
        })
    }

    /// A single-series graph over `values.len()` consecutive days starting
    /// at `start_ms`.
    pub fn daily_graph(start_ms: i64, legend: &str, values: &[i64]) -> Value {
        let mut x_axis = vec![json!("x")];
        x_axis.extend((0..values.len()).map(|i| json!(start_ms + i as i64 * DAY_MS)));

        let mut series = vec![json!("y0")];
        series.extend(values.iter().map(|v| json!(v)));

        graph(json!([x_axis, series]), json!({ "y0": legend }))
    }

    /// A two-series followers graph (joined and left) over consecutive days.
    pub fn followers_graph(start_ms: i64, joined: &[i64], left: &[i64]) -> Value {
        let mut x_axis = vec![json!("x")];
        x_axis.extend((0..joined.len()).map(|i| json!(start_ms + i as i64 * DAY_MS)));

        let mut joined_series = vec![json!("y0")];
        joined_series.extend(joined.iter().map(|v| json!(v)));
        let mut left_series = vec![json!("y1")];
        left_series.extend(left.iter().map(|v| json!(v)));

        graph(
            json!([x_axis, joined_series, left_series]),
            json!({ "y0": "Joined", "y1": "Left" }),
        )
    }

    /// A broadcast statistics object with every supported field populated
    /// over three days starting 2024-06-01, plus fields that must be
    /// ignored.
    pub fn broadcast_stats() -> super::StatsObject {
        let value = json!({
            "_": "stats.BroadcastStats",
            "period": { "_": "StatsDateRangeDays", "min_date": "2024-05-04", "max_date": "2024-06-03" },
            "followers": abs_value(1200.0, 1100.0),
            "views_per_post": abs_value(340.5, 300.0),
            "shares_per_post": abs_value(12.0, 9.0),
            "reactions_per_post": abs_value(25.0, 20.0),
            "views_per_story": abs_value(1.0, 1.0),
            "enabled_notifications": { "_": "StatsPercentValue", "part": 10.0, "total": 100.0 },
            "growth_graph": daily_graph(JUNE_FIRST_2024_MS, "Total followers", &[1150, 1175, 1200]),
            "followers_graph": followers_graph(JUNE_FIRST_2024_MS, &[30, 28, 31], &[5, 3, 6]),
            "mute_graph": daily_graph(JUNE_FIRST_2024_MS, "Muted", &[2, 1, 0]),
            "top_hours_graph": { "_": "StatsGraphAsync", "token": "abc" },
            "interactions_graph": { "_": "StatsGraphError", "error": "Not enough data" }
        });

        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture is an object"),
        }
    }
}

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `ChannelSource::channels_to_process`
    Channels,
    /// `StatsSource::get_stats`
    GetStats(String),
    /// `RecordSink::exists`
    Exists {
        table: String,
        handle: String,
        date: NaiveDate,
    },
    /// `RecordSink::insert`
    Insert {
        table: String,
        handle: Option<String>,
        date: Option<NaiveDate>,
    },
}

/// Shared, ordered log of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.lock().expect("call log poisoned").push(call);
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().expect("call log poisoned").clone()
    }
}

/// Channel source returning a fixed list.
#[derive(Debug, Clone)]
pub struct StaticChannels {
    handles: Vec<Handle>,
    log: CallLog,
}

impl StaticChannels {
    /// Creates a source over the given handles.
    pub fn new(handles: &[&str], log: CallLog) -> Self {
        Self {
            handles: handles.iter().map(|h| Handle::new_unchecked(*h)).collect(),
            log,
        }
    }
}

#[async_trait]
impl ChannelSource for StaticChannels {
    async fn channels_to_process(&self) -> Result<Vec<Handle>> {
        self.log.push(Call::Channels);
        Ok(self.handles.clone())
    }
}

/// Stats source serving fixtures by handle; unknown handles fail like an
/// unresolvable channel.
#[derive(Debug, Clone)]
pub struct FixtureStats {
    stats: HashMap<String, StatsObject>,
    log: CallLog,
}

impl FixtureStats {
    /// Creates an empty source.
    pub fn new(log: CallLog) -> Self {
        Self {
            stats: HashMap::new(),
            log,
        }
    }

    /// Registers a statistics object for `handle`.
    pub fn with(mut self, handle: &str, stats: StatsObject) -> Self {
        self.stats.insert(handle.to_string(), stats);
        self
    }
}

#[async_trait]
impl StatsSource for FixtureStats {
    async fn get_stats(&self, handle: &Handle) -> Result<StatsObject> {
        self.log.push(Call::GetStats(handle.to_string()));
        self.stats.get(handle.as_str()).cloned().ok_or_else(|| {
            StratosphereError::telegram_with_status(
                format!("Channel '{}' could not be resolved", handle),
                404,
            )
        })
    }
}

/// Sink keeping rows in memory per table.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    rows: Arc<Mutex<HashMap<String, Vec<RowFields>>>>,
    log: CallLog,
    fail_inserts: bool,
}

impl InMemorySink {
    /// Creates an empty sink.
    pub fn new(log: CallLog) -> Self {
        Self {
            rows: Arc::default(),
            log,
            fail_inserts: false,
        }
    }

    /// Makes every insert fail with a Notion API error.
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Rows stored in `table`.
    pub fn rows(&self, table: &TableId) -> Vec<RowFields> {
        self.rows
            .lock()
            .expect("sink poisoned")
            .get(table.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Pre-populates `table` with a row.
    pub fn seed(&self, table: &TableId, row: RowFields) {
        self.rows
            .lock()
            .expect("sink poisoned")
            .entry(table.as_str().to_string())
            .or_default()
            .push(row);
    }
}

fn row_handle(row: &RowFields) -> Option<String> {
    match row.get(HANDLE_COLUMN) {
        Some(FieldValue::Title(handle)) => Some(handle.clone()),
        _ => None,
    }
}

fn row_date(row: &RowFields) -> Option<NaiveDate> {
    match row.get(DATE_COLUMN) {
        Some(FieldValue::Date(date)) => Some(*date),
        _ => None,
    }
}

#[async_trait]
impl RecordSink for InMemorySink {
    async fn exists(&self, table: &TableId, handle: &str, date: NaiveDate) -> Result<bool> {
        self.log.push(Call::Exists {
            table: table.to_string(),
            handle: handle.to_string(),
            date,
        });

        let rows = self.rows.lock().expect("sink poisoned");
        Ok(rows.get(table.as_str()).is_some_and(|rows| {
            rows.iter().any(|row| {
                row_handle(row).as_deref() == Some(handle) && row_date(row) == Some(date)
            })
        }))
    }

    async fn insert(&self, table: &TableId, fields: &RowFields) -> Result<()> {
        self.log.push(Call::Insert {
            table: table.to_string(),
            handle: row_handle(fields),
            date: row_date(fields),
        });

        if self.fail_inserts {
            return Err(StratosphereError::notion_with_status("insert rejected", 500));
        }

        self.rows
            .lock()
            .expect("sink poisoned")
            .entry(table.as_str().to_string())
            .or_default()
            .push(fields.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_broadcast_fixture_shape() {
        let stats = stats_fixtures::broadcast_stats();
        assert_eq!(stats["followers"]["_"], "StatsAbsValueAndPrev");
        assert_eq!(stats["mute_graph"]["_"], "StatsGraph");
        assert!(stats["growth_graph"]["json"]["data"].is_string());
    }

    #[tokio::test]
    async fn test_in_memory_sink_exists_after_insert() {
        let log = CallLog::new();
        let sink = InMemorySink::new(log.clone());
        let table = TableId::new("state");
        let day = date(2024, 6, 10);

        assert!(!sink.exists(&table, "alpha", day).await.unwrap());

        let row = RowFields::new()
            .date(DATE_COLUMN, day)
            .title(HANDLE_COLUMN, "alpha");
        sink.insert(&table, &row).await.unwrap();

        assert!(sink.exists(&table, "alpha", day).await.unwrap());
        assert!(!sink.exists(&table, "beta", day).await.unwrap());
        assert!(!sink.exists(&TableId::new("other"), "alpha", day).await.unwrap());
        assert_eq!(sink.rows(&table).len(), 1);
        assert_eq!(log.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_fixture_stats_unknown_handle() {
        let source = FixtureStats::new(CallLog::new());
        let err = source
            .get_stats(&Handle::new("ghost").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }
}
