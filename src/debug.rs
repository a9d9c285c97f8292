//! JSON export of verdicts for debug rendering.

use crate::footprint::ExtendedPolygon;
use crate::safety::{Anomaly, SafetyVerdict, ViolationRecord};
use serde_json::{json, Value};

fn polygon(polygon: &ExtendedPolygon) -> Value {
    json!(polygon.ring().iter().map(|p| [p.x, p.y]).collect::<Vec<_>>())
}

fn violation(record: &ViolationRecord) -> Value {
    json!({
        "object": record.object,
        "time": record.time,
        "criterion": record.criterion.as_str(),
        "ego_polygon": polygon(&record.ego_polygon),
        "object_polygon": polygon(&record.object_polygon),
        "rss_distance": record.rss_distance,
        "gap": record.gap,
    })
}

fn anomaly(anomaly: &Anomaly) -> Value {
    json!({
        "object": anomaly.object,
        "time": anomaly.time,
        "cause": anomaly.cause.to_string(),
    })
}

/// Converts a verdict into a JSON value.
pub fn verdict_to_json(verdict: &SafetyVerdict) -> Value {
    json!({
        "safe": verdict.is_safe(),
        "violations": verdict.violations().iter().map(violation).collect::<Vec<_>>(),
        "anomalies": verdict.anomalies().iter().map(anomaly).collect::<Vec<_>>(),
    })
}
