//! Merges per-metric rows into the two per-channel tables.

use crate::{
    classifier::classify,
    graph::{decode_graph, DecodedGraph},
    model::{GraphKey, MetricRow, StateKey},
    records::{StateRecord, TimeseriesRecord},
    state::transform_state_metric,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use stratosphere_common::{DateZone, Handle, Result, StatsObject};
use tracing::{debug, instrument};

/// Rows produced from one channel's statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelRows {
    /// State snapshots, ascending by date
    pub state: Vec<StateRecord>,
    /// Timeseries days, ascending by date
    pub timeseries: Vec<TimeseriesRecord>,
}

/// Timeseries column a graph series feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesColumn {
    Joined,
    Mute,
    Left,
    Followers,
}

fn series_column(graph: GraphKey, legend: &str) -> Option<SeriesColumn> {
    let matches = |expected: &str| legend.trim().eq_ignore_ascii_case(expected);
    match graph {
        GraphKey::Growth if matches("Total followers") => Some(SeriesColumn::Followers),
        GraphKey::Followers if matches("Joined") => Some(SeriesColumn::Joined),
        GraphKey::Followers if matches("Left") => Some(SeriesColumn::Left),
        GraphKey::Mute if matches("Muted") => Some(SeriesColumn::Mute),
        _ => None,
    }
}

/// Outer-merges metric rows by date. Metrics absent on a date stay `None`.
pub fn assemble_state(handle: &Handle, rows: &[MetricRow]) -> Vec<StateRecord> {
    let mut by_date: BTreeMap<NaiveDate, StateRecord> = BTreeMap::new();

    for row in rows {
        let record = by_date
            .entry(row.date)
            .or_insert_with(|| StateRecord::new(row.date, handle.clone()));
        let slot = match row.key {
            StateKey::Followers => &mut record.followers,
            StateKey::ReactionsPerPost => &mut record.reactions,
            StateKey::ViewsPerPost => &mut record.views,
            StateKey::SharesPerPost => &mut record.shares,
        };
        *slot = Some(row.value);
    }

    by_date.into_values().collect()
}

/// Builds one zero-filled record per distinct x-axis date of any graph.
///
/// Days whose values are all null and series that feed no column (e.g.
/// "Unmuted") still contribute their dates to the spine.
pub fn assemble_timeseries(handle: &Handle, graphs: &[(GraphKey, DecodedGraph)]) -> Vec<TimeseriesRecord> {
    let spine: BTreeSet<NaiveDate> = graphs
        .iter()
        .flat_map(|(_, graph)| graph.dates.iter().copied().chain(graph.rows.iter().map(|row| row.date)))
        .collect();

    let mut by_date: BTreeMap<NaiveDate, TimeseriesRecord> = spine
        .into_iter()
        .map(|date| (date, TimeseriesRecord::new(date, handle.clone())))
        .collect();

    for (graph, decoded) in graphs {
        for row in &decoded.rows {
            let Some(column) = series_column(*graph, &row.display_name) else {
                continue;
            };
            if let Some(record) = by_date.get_mut(&row.date) {
                let slot = match column {
                    SeriesColumn::Joined => &mut record.joined,
                    SeriesColumn::Mute => &mut record.mute,
                    SeriesColumn::Left => &mut record.left,
                    SeriesColumn::Followers => &mut record.followers,
                };
                *slot = row.value;
            }
        }
    }

    by_date.into_values().collect()
}

/// Classifies, transforms and assembles one channel's statistics.
///
/// `today` dates the state rows; `zone` turns graph timestamps into dates.
#[instrument(skip(stats, zone), fields(handle = %handle))]
pub fn transform_stats(handle: &Handle, stats: &StatsObject, today: NaiveDate, zone: &DateZone) -> Result<ChannelRows> {
    let classified = classify(stats);
    debug!(
        state_metrics = classified.state.len(),
        graphs = classified.graphs.len(),
        "Classified statistics"
    );

    let mut metric_rows = Vec::with_capacity(classified.state.len() * 2);
    for (key, value) in &classified.state {
        metric_rows.extend(transform_state_metric(*key, value, today)?);
    }

    let mut graph_rows = Vec::with_capacity(classified.graphs.len());
    for (key, value) in &classified.graphs {
        graph_rows.push((*key, decode_graph(value, zone)?));
    }

    Ok(ChannelRows {
        state: assemble_state(handle, &metric_rows),
        timeseries: assemble_timeseries(handle, &graph_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GraphRow;
    use serde_json::json;
    use stratosphere_common::test_utils::{
        date,
        stats_fixtures::{graph, DAY_MS, JUNE_FIRST_2024_MS},
    };

    fn metric(date: NaiveDate, key: StateKey, value: f64) -> MetricRow {
        MetricRow {
            date,
            key,
            display_name: key.display_name(),
            value,
        }
    }

    fn point(date: NaiveDate, name: &str, value: f64) -> GraphRow {
        GraphRow {
            date,
            display_name: name.to_string(),
            value,
        }
    }

    fn decoded(rows: Vec<GraphRow>) -> DecodedGraph {
        let dates: BTreeSet<NaiveDate> = rows.iter().map(|row| row.date).collect();
        DecodedGraph {
            dates: dates.into_iter().collect(),
            rows,
        }
    }

    #[test]
    fn test_state_outer_merge_keeps_missing_as_none() {
        let handle = Handle::new("alpha").unwrap();
        let rows = vec![
            metric(date(2024, 6, 10), StateKey::Followers, 120.0),
            metric(date(2024, 6, 3), StateKey::Followers, 100.0),
            metric(date(2024, 6, 10), StateKey::SharesPerPost, 4.0),
            metric(date(2024, 6, 3), StateKey::SharesPerPost, 2.0),
        ];

        let records = assemble_state(&handle, &rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2024, 6, 3));
        assert_eq!(records[0].followers, Some(100.0));
        assert_eq!(records[0].shares, Some(2.0));
        assert_eq!(records[0].views, None);
        assert_eq!(records[1].date, date(2024, 6, 10));
        assert_eq!(records[1].reactions, None);
    }

    #[test]
    fn test_timeseries_zero_fills_missing_graph() {
        let handle = Handle::new("alpha").unwrap();
        let graphs = vec![
            (
                GraphKey::Followers,
                decoded(vec![
                    point(date(2024, 6, 2), "Joined", 4.0),
                    point(date(2024, 6, 2), "Left", 1.0),
                    point(date(2024, 6, 1), "Joined", 3.0),
                ]),
            ),
            (
                GraphKey::Growth,
                decoded(vec![point(date(2024, 6, 1), "total FOLLOWERS", 90.0)]),
            ),
        ];

        let records = assemble_timeseries(&handle, &graphs);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2024, 6, 1));
        assert_eq!(records[0].joined, 3.0);
        assert_eq!(records[0].left, 0.0);
        assert_eq!(records[0].followers, 90.0);
        assert_eq!(records[1].followers, 0.0);
        assert!(records.iter().all(|r| r.mute == 0.0));
    }

    #[test]
    fn test_unmapped_series_only_extend_spine() {
        let handle = Handle::new("alpha").unwrap();
        let graphs = vec![(
            GraphKey::Mute,
            decoded(vec![
                point(date(2024, 6, 1), "Muted", 2.0),
                point(date(2024, 6, 5), "Unmuted", 7.0),
            ]),
        )];

        let records = assemble_timeseries(&handle, &graphs);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mute, 2.0);
        assert_eq!(records[1].date, date(2024, 6, 5));
        assert_eq!(records[1].mute, 0.0);
    }

    #[test]
    fn test_all_null_day_stays_on_spine() {
        let handle = Handle::new("alpha").unwrap();
        let mut stats = StatsObject::new();
        stats.insert(
            "mute_graph".into(),
            graph(
                json!([["x", JUNE_FIRST_2024_MS, JUNE_FIRST_2024_MS + DAY_MS], ["y0", null, 4]]),
                json!({ "y0": "Muted" }),
            ),
        );

        let rows = transform_stats(&handle, &stats, date(2024, 6, 10), &DateZone::Utc).unwrap();

        let got: Vec<_> = rows.timeseries.iter().map(|r| (r.date, r.mute)).collect();
        assert_eq!(got, vec![(date(2024, 6, 1), 0.0), (date(2024, 6, 2), 4.0)]);
        assert!(rows.state.is_empty());
    }

    #[test]
    fn test_legend_must_match_its_graph() {
        // "Joined" in the mute graph feeds nothing
        assert_eq!(series_column(GraphKey::Mute, "Joined"), None);
        assert_eq!(series_column(GraphKey::Followers, " left "), Some(SeriesColumn::Left));
    }

    #[test]
    fn test_no_graphs_no_timeseries() {
        let handle = Handle::new("alpha").unwrap();
        assert!(assemble_timeseries(&handle, &[]).is_empty());
    }
}
