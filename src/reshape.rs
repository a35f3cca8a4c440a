//! Daily-metric time-series reshaping
//!
//! The performance API returns one time series per (location, metric) pair.
//! Downstream consumers want long-format rows keyed by
//! (location, date, metric), so the engine accumulates the per-location
//! series and this module pivots them. Pure pivot, no aggregation.

use crate::types::{JsonValue, Row};
use indexmap::IndexMap;

/// metric name → value for one day
pub type MetricValues = IndexMap<String, i64>;

/// date (`YYYY-MM-DD`) → metrics for one location
pub type DatedMetrics = IndexMap<String, MetricValues>;

/// location id → dated metrics
pub type LocationMetrics = IndexMap<String, DatedMetrics>;

/// Pivot per-location time series into one row per (location, date, metric)
pub fn reshape(data: &LocationMetrics) -> Vec<Row> {
    let mut rows = Vec::new();
    for (location_id, dates) in data {
        for (date, metrics) in dates {
            for (metric, value) in metrics {
                let mut row = Row::new();
                row.insert("location_id".to_string(), JsonValue::from(location_id.as_str()));
                row.insert("date".to_string(), JsonValue::from(date.as_str()));
                row.insert("metric".to_string(), JsonValue::from(metric.as_str()));
                row.insert("value".to_string(), JsonValue::from(*value));
                rows.push(row);
            }
        }
    }
    rows
}
