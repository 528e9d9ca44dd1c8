//! Splits a raw statistics object into state metrics and graphs.

use crate::model::{GraphKey, StateKey, ABS_VALUE_TAG, GRAPH_TAG, TYPE_KEY};
use serde_json::Value;
use stratosphere_common::StatsObject;
use tracing::debug;

/// Fields of one statistics object that the pipeline knows how to use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedStats {
    /// Current/previous metrics, in field order
    pub state: Vec<(StateKey, Value)>,
    /// Fully loaded graphs, in field order
    pub graphs: Vec<(GraphKey, Value)>,
}

impl ClassifiedStats {
    /// True when nothing usable was found.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty() && self.graphs.is_empty()
    }
}

/// Type discriminator of a value, if it is an object carrying one.
pub fn discriminator(value: &Value) -> Option<&str> {
    value.get(TYPE_KEY).and_then(Value::as_str)
}

/// Whether `(key, value)` is a supported current/previous metric.
pub fn is_state_metric(key: &str, value: &Value) -> Option<StateKey> {
    let state_key = StateKey::from_field(key)?;
    (discriminator(value) == Some(ABS_VALUE_TAG)).then_some(state_key)
}

/// Whether `(key, value)` is a supported, fully loaded graph.
pub fn is_processable_graph(key: &str, value: &Value) -> Option<GraphKey> {
    let graph_key = GraphKey::from_field(key)?;
    (discriminator(value) == Some(GRAPH_TAG)).then_some(graph_key)
}

/// Partitions `stats` into state metrics and graphs. Everything else is
/// dropped.
pub fn classify(stats: &StatsObject) -> ClassifiedStats {
    let mut classified = ClassifiedStats::default();

    for (key, value) in stats {
        if let Some(state_key) = is_state_metric(key, value) {
            classified.state.push((state_key, value.clone()));
        } else if let Some(graph_key) = is_processable_graph(key, value) {
            classified.graphs.push((graph_key, value.clone()));
        } else {
            debug!(field = %key, kind = ?discriminator(value), "Ignoring statistics field");
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratosphere_common::test_utils::stats_fixtures::{abs_value, broadcast_stats, daily_graph};

    #[test]
    fn test_classify_broadcast_stats() {
        let classified = classify(&broadcast_stats());

        let mut state: Vec<_> = classified.state.iter().map(|(k, _)| *k).collect();
        state.sort();
        assert_eq!(state, StateKey::ALL.to_vec());

        let mut graphs: Vec<_> = classified.graphs.iter().map(|(k, _)| *k).collect();
        graphs.sort();
        assert_eq!(graphs, GraphKey::ALL.to_vec());
    }

    #[test]
    fn test_wrong_tag_is_not_applicable() {
        // A supported field name with the wrong discriminator
        let graph_as_state = daily_graph(0, "Total followers", &[1]);
        assert_eq!(is_state_metric("followers", &graph_as_state), None);
        assert_eq!(is_processable_graph("growth_graph", &abs_value(1.0, 2.0)), None);

        // Lazily loaded graphs are skipped
        let lazy = json!({ "_": "StatsGraphAsync", "token": "t" });
        assert_eq!(is_processable_graph("growth_graph", &lazy), None);
    }

    #[test]
    fn test_non_object_and_untagged_values() {
        assert_eq!(is_state_metric("followers", &json!(5)), None);
        assert_eq!(is_state_metric("followers", &json!({ "current": 1, "previous": 2 })), None);
        assert_eq!(is_processable_graph("mute_graph", &Value::Null), None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut stats = StatsObject::new();
        stats.insert("views_per_story".into(), abs_value(3.0, 1.0));
        stats.insert("languages_graph".into(), daily_graph(0, "English", &[1, 2]));

        let classified = classify(&stats);
        assert!(classified.is_empty());
    }
}
