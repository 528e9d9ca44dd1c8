//! End-to-end transformation tests over realistic statistics payloads.

use proptest::prelude::*;
use serde_json::json;
use stratosphere_common::{
    test_utils::{
        date,
        stats_fixtures::{abs_value, broadcast_stats, daily_graph, graph, DAY_MS, JUNE_FIRST_2024_MS},
    },
    DateZone, Handle, StatsObject,
};
use stratosphere_stats::{decode_graph, transform_stats};

fn handle() -> Handle {
    Handle::new("alpha").unwrap()
}

#[test]
fn test_broadcast_stats_produce_both_tables() {
    let rows = transform_stats(&handle(), &broadcast_stats(), date(2024, 6, 10), &DateZone::Utc).unwrap();

    assert_eq!(rows.state.len(), 2);
    let week_ago = &rows.state[0];
    let today = &rows.state[1];
    assert_eq!(week_ago.date, date(2024, 6, 3));
    assert_eq!(week_ago.followers, Some(1100.0));
    assert_eq!(today.date, date(2024, 6, 10));
    assert_eq!(today.followers, Some(1200.0));
    assert_eq!(today.views, Some(340.5));
    assert_eq!(today.shares, Some(12.0));
    assert_eq!(today.reactions, Some(25.0));

    let got: Vec<_> = rows
        .timeseries
        .iter()
        .map(|r| (r.date, r.joined, r.mute, r.left, r.followers))
        .collect();
    assert_eq!(
        got,
        vec![
            (date(2024, 6, 1), 30.0, 2.0, 5.0, 1150.0),
            (date(2024, 6, 2), 28.0, 1.0, 3.0, 1175.0),
            (date(2024, 6, 3), 31.0, 0.0, 6.0, 1200.0),
        ]
    );
    assert!(rows.timeseries.iter().all(|r| r.handle.as_str() == "alpha"));
}

#[test]
fn test_missing_mute_graph_and_views() {
    let mut stats = broadcast_stats();
    stats.remove("mute_graph");
    stats.remove("views_per_post");

    let rows = transform_stats(&handle(), &stats, date(2024, 6, 10), &DateZone::Utc).unwrap();

    assert!(rows.timeseries.iter().all(|r| r.mute == 0.0));
    assert!(rows.state.iter().all(|r| r.views.is_none()));
    assert!(rows.state.iter().all(|r| r.followers.is_some()));
}

#[test]
fn test_megagroup_shape_has_no_usable_fields() {
    let stats: StatsObject = match json!({
        "_": "stats.MegagroupStats",
        "members": abs_value(500.0, 480.0),
        "messages": abs_value(90.0, 70.0),
        "members_graph": daily_graph(JUNE_FIRST_2024_MS, "Total", &[480, 500]),
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };

    let rows = transform_stats(&handle(), &stats, date(2024, 6, 10), &DateZone::Utc).unwrap();
    assert!(rows.state.is_empty());
    assert!(rows.timeseries.is_empty());
}

#[test]
fn test_malformed_graph_aborts_transformation() {
    let mut stats = broadcast_stats();
    stats.insert(
        "growth_graph".into(),
        json!({ "_": "StatsGraph", "json": { "_": "DataJSON", "data": "[" } }),
    );

    let err = transform_stats(&handle(), &stats, date(2024, 6, 10), &DateZone::Utc).unwrap_err();
    assert!(err.is_contract());
}

proptest! {
    #[test]
    fn prop_graph_row_count(days in 1usize..40, series in 1usize..5) {
        let mut x_axis = vec![json!("x")];
        x_axis.extend((0..days).map(|d| json!(JUNE_FIRST_2024_MS + d as i64 * DAY_MS)));

        let mut columns = vec![json!(x_axis)];
        let mut names = serde_json::Map::new();
        for s in 0..series {
            let code = format!("y{}", s);
            let mut column = vec![json!(code.clone())];
            column.extend((0..days).map(|d| json!(d * s)));
            columns.push(json!(column));
            names.insert(code, json!(format!("Series {}", s)));
        }

        let value = graph(json!(columns), json!(names));
        let decoded = decode_graph(&value, &DateZone::Utc).unwrap();
        prop_assert_eq!(decoded.rows.len(), days * series);
        prop_assert_eq!(decoded.dates.len(), days);
    }
}
