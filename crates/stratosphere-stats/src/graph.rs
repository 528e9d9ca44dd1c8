//! Decoder for the columnar graph encoding used by the statistics API.
//!
//! A `StatsGraph` carries its payload as a JSON *string* under
//! `json.data`:
//!
//! ```json
//! {"columns": [["x", 1717200000000, 1717286400000], ["y0", 30, 28]],
//!  "names": {"y0": "Joined"}}
//! ```
//!
//! `columns[0]` is the x-axis (a header followed by millisecond
//! timestamps), every other column is a series code followed by one value
//! per x-axis entry, and `names` maps series codes to legend names.

use crate::model::GraphRow;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use stratosphere_common::{epoch_millis_to_date, DateZone, Result, StratosphereError};
use tracing::{debug, trace};

/// A decoded graph: every x-axis day plus the non-null points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGraph {
    /// Dates of x-axis entries `1..D`, including days whose values are all
    /// null
    pub dates: Vec<NaiveDate>,
    /// One row per non-null (day, series) value, days outermost
    pub rows: Vec<GraphRow>,
}

/// Decodes a graph into its x-axis days and one row per (day, series)
/// pair.
///
/// Null series values are gaps and produce no row, but their day is still
/// listed in [`DecodedGraph::dates`]. A payload with fewer than two columns
/// decodes to nothing.
pub fn decode_graph(graph: &Value, zone: &DateZone) -> Result<DecodedGraph> {
    let payload = graph_payload(graph)?;

    let columns = payload
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| StratosphereError::contract_field("Graph payload has no columns", "columns"))?;

    if columns.len() < 2 {
        debug!(columns = columns.len(), "Graph has no series, nothing to decode");
        return Ok(DecodedGraph::default());
    }

    let names = payload
        .get("names")
        .and_then(Value::as_object)
        .ok_or_else(|| StratosphereError::contract_field("Graph payload has no names", "names"))?;

    let x_axis = columns[0]
        .as_array()
        .ok_or_else(|| StratosphereError::contract_field("Graph x-axis is not an array", "columns"))?;
    let dates = decode_x_axis(x_axis, zone)?;

    let series = columns[1..]
        .iter()
        .map(|column| Series::parse(column, names, x_axis.len()))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(dates.len() * series.len());
    for (offset, date) in dates.iter().enumerate() {
        let day = offset + 1;
        for s in &series {
            let value = &s.values[day];
            if value.is_null() {
                trace!(series = %s.name, %date, "Skipping null graph value");
                continue;
            }
            let value = value.as_f64().ok_or_else(|| {
                StratosphereError::contract_field(
                    format!("Graph series '{}' has a non-numeric value at index {}", s.code, day),
                    "columns",
                )
            })?;
            rows.push(GraphRow {
                date: *date,
                display_name: s.name.clone(),
                value,
            });
        }
    }

    debug!(days = dates.len(), series = series.len(), rows = rows.len(), "Decoded graph");
    Ok(DecodedGraph { dates, rows })
}

/// Parses the JSON string stored under `json.data`.
fn graph_payload(graph: &Value) -> Result<Value> {
    let json = graph
        .get("json")
        .ok_or_else(|| StratosphereError::contract_field("Graph has no json payload", "json"))?;

    let data = json
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| StratosphereError::contract_field("Graph payload has no data string", "data"))?;

    serde_json::from_str(data).map_err(|e| {
        StratosphereError::contract_field(format!("Graph data is not valid JSON: {}", e), "data")
    })
}

/// Dates of x-axis entries `1..len`; entry 0 is the header.
fn decode_x_axis(x_axis: &[Value], zone: &DateZone) -> Result<Vec<NaiveDate>> {
    x_axis
        .iter()
        .enumerate()
        .skip(1)
        .map(|(index, raw)| {
            let millis = raw
                .as_i64()
                .or_else(|| raw.as_f64().map(|f| f as i64))
                .ok_or_else(|| {
                    StratosphereError::contract_field(
                        format!("Graph timestamp at index {} is not a number", index),
                        "columns",
                    )
                })?;
            epoch_millis_to_date(millis, zone).ok_or_else(|| {
                StratosphereError::contract_field(
                    format!("Graph timestamp {} is out of range", millis),
                    "columns",
                )
            })
        })
        .collect()
}

struct Series<'a> {
    code: &'a str,
    name: String,
    values: &'a [Value],
}

impl<'a> Series<'a> {
    fn parse(column: &'a Value, names: &Map<String, Value>, x_len: usize) -> Result<Self> {
        let values = column
            .as_array()
            .ok_or_else(|| StratosphereError::contract_field("Graph series is not an array", "columns"))?;

        let code = values
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| StratosphereError::contract_field("Graph series has no code", "columns"))?;

        let name = names.get(code).and_then(Value::as_str).ok_or_else(|| {
            StratosphereError::contract_field(format!("Graph series '{}' is not in the legend", code), "names")
        })?;

        if values.len() < x_len {
            return Err(StratosphereError::contract_field(
                format!(
                    "Graph series '{}' has {} entries, x-axis has {}",
                    code,
                    values.len(),
                    x_len
                ),
                "columns",
            ));
        }

        Ok(Self {
            code,
            name: name.to_string(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratosphere_common::test_utils::{
        date,
        stats_fixtures::{daily_graph, followers_graph, graph, DAY_MS, JUNE_FIRST_2024_MS},
    };

    #[test]
    fn test_decodes_every_index_after_header() {
        let value = graph(json!([[0, 1000, 86_401_000], ["y0", 50, 60]]), json!({ "y0": "Joined" }));
        let rows = decode_graph(&value, &DateZone::Utc).unwrap().rows;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(1970, 1, 1));
        assert_eq!(rows[0].display_name, "Joined");
        assert_eq!(rows[0].value, 50.0);
        assert_eq!(rows[1].date, date(1970, 1, 2));
        assert_eq!(rows[1].value, 60.0);
    }

    #[test]
    fn test_two_series_day_major_order() {
        let value = followers_graph(JUNE_FIRST_2024_MS, &[30, 28], &[5, 3]);
        let rows = decode_graph(&value, &DateZone::Utc).unwrap().rows;

        let got: Vec<_> = rows
            .iter()
            .map(|r| (r.date, r.display_name.as_str(), r.value))
            .collect();
        assert_eq!(
            got,
            vec![
                (date(2024, 6, 1), "Joined", 30.0),
                (date(2024, 6, 1), "Left", 5.0),
                (date(2024, 6, 2), "Joined", 28.0),
                (date(2024, 6, 2), "Left", 3.0),
            ]
        );
    }

    #[test]
    fn test_null_value_is_skipped() {
        let value = graph(
            json!([["x", JUNE_FIRST_2024_MS, JUNE_FIRST_2024_MS + DAY_MS], ["y0", null, 4]]),
            json!({ "y0": "Muted" }),
        );
        let decoded = decode_graph(&value, &DateZone::Utc).unwrap();
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rows[0].date, date(2024, 6, 2));
        assert_eq!(decoded.dates, vec![date(2024, 6, 1), date(2024, 6, 2)]);
    }

    #[test]
    fn test_fewer_than_two_columns_is_empty() {
        let value = graph(json!([["x", JUNE_FIRST_2024_MS]]), json!({}));
        assert_eq!(decode_graph(&value, &DateZone::Utc).unwrap(), DecodedGraph::default());
    }

    #[test]
    fn test_contract_violations() {
        let zone = DateZone::Utc;

        let no_json = json!({ "_": "StatsGraph" });
        assert!(decode_graph(&no_json, &zone).unwrap_err().is_contract());

        let bad_data = json!({ "_": "StatsGraph", "json": { "data": "{not json" } });
        assert!(decode_graph(&bad_data, &zone).unwrap_err().is_contract());

        let unknown_code = graph(json!([["x", 0, 1], ["y9", 1, 2]]), json!({ "y0": "Joined" }));
        assert!(decode_graph(&unknown_code, &zone).unwrap_err().is_contract());

        let short_series = graph(json!([["x", 0, 1, 2], ["y0", 1]]), json!({ "y0": "Joined" }));
        assert!(decode_graph(&short_series, &zone).unwrap_err().is_contract());

        let text_value = graph(json!([["x", 0], ["y0", "many"]]), json!({ "y0": "Joined" }));
        assert!(decode_graph(&text_value, &zone).unwrap_err().is_contract());
    }

    #[test]
    fn test_timestamps_follow_zone() {
        // 2024-06-01T23:00:00Z is already June 2nd in Tokyo
        let late = JUNE_FIRST_2024_MS + 23 * 3_600_000;
        let value = daily_graph(late, "Total followers", &[10]);

        let utc = decode_graph(&value, &DateZone::Utc).unwrap().rows;
        let tokyo = decode_graph(&value, &DateZone::Named(chrono_tz::Asia::Tokyo)).unwrap().rows;

        assert_eq!(utc[0].date, date(2024, 6, 1));
        assert_eq!(tokyo[0].date, date(2024, 6, 2));
    }
}
