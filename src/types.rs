//! Common types used throughout the extractor
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A flattened record: composite column name to scalar value, in
/// first-seen order
pub type Row = IndexMap<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

/// Backoff strategy between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Same delay every attempt
    Constant,
    /// Delay grows by the initial amount each attempt (15s, 30s, 45s, ...)
    #[default]
    Linear,
    /// Delay doubles each attempt
    Exponential,
}

// ============================================================================
// Load Mode
// ============================================================================

/// How the downstream consumer should apply the produced tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Merge rows into prior state by primary key
    #[default]
    Incremental,
    /// Replace the whole table
    FullLoad,
}

impl LoadMode {
    /// Manifest flag value: true unless the load mode is explicitly full load
    pub fn is_incremental(self) -> bool {
        matches!(self, Self::Incremental)
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Per-location endpoints that can be requested for a run
///
/// Accounts and locations are always extracted; these select which
/// sub-resources are fetched for each location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    DailyMetrics,
    Reviews,
    Media,
    Questions,
}

impl Endpoint {
    /// All selectable endpoints, in processing order
    pub const ALL: [Endpoint; 4] = [
        Endpoint::DailyMetrics,
        Endpoint::Reviews,
        Endpoint::Media,
        Endpoint::Questions,
    ];

    /// Output table name for this endpoint
    pub fn table(self) -> &'static str {
        match self {
            Endpoint::DailyMetrics => "daily_metrics",
            Endpoint::Reviews => "reviews",
            Endpoint::Media => "media",
            Endpoint::Questions => "questions",
        }
    }

    /// Name of the field holding the records array in API responses
    ///
    /// Daily metrics responses are a time series, not a record array, and
    /// are handled separately by the engine.
    pub fn records_field(self) -> &'static str {
        match self {
            Endpoint::DailyMetrics => "timeSeries",
            Endpoint::Reviews => "reviews",
            Endpoint::Media => "mediaItems",
            Endpoint::Questions => "questions",
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dailyMetrics" => Ok(Endpoint::DailyMetrics),
            "reviews" => Ok(Endpoint::Reviews),
            "media" => Ok(Endpoint::Media),
            "questions" => Ok(Endpoint::Questions),
            other => Err(format!("unknown endpoint: {other}")),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Endpoint::DailyMetrics => "dailyMetrics",
            Endpoint::Reviews => "reviews",
            Endpoint::Media => "media",
            Endpoint::Questions => "questions",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Daily Metrics
// ============================================================================

/// Daily performance metrics available from the performance API
pub const AVAILABLE_DAILY_METRICS: [&str; 11] = [
    "BUSINESS_IMPRESSIONS_DESKTOP_MAPS",
    "BUSINESS_IMPRESSIONS_DESKTOP_SEARCH",
    "BUSINESS_IMPRESSIONS_MOBILE_MAPS",
    "BUSINESS_IMPRESSIONS_MOBILE_SEARCH",
    "BUSINESS_CONVERSATIONS",
    "BUSINESS_DIRECTION_REQUESTS",
    "CALL_CLICKS",
    "WEBSITE_CLICKS",
    "BUSINESS_BOOKINGS",
    "BUSINESS_FOOD_ORDERS",
    "BUSINESS_FOOD_MENU_CLICKS",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parse_roundtrip() {
        for endpoint in Endpoint::ALL {
            let parsed: Endpoint = endpoint.to_string().parse().unwrap();
            assert_eq!(parsed, endpoint);
        }
        assert!("insights".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_endpoint_serde_names() {
        let parsed: Endpoint = serde_json::from_str("\"dailyMetrics\"").unwrap();
        assert_eq!(parsed, Endpoint::DailyMetrics);
        assert_eq!(
            serde_json::to_string(&Endpoint::DailyMetrics).unwrap(),
            "\"dailyMetrics\""
        );
    }

    #[test]
    fn test_load_mode_incremental_flag() {
        assert!(LoadMode::Incremental.is_incremental());
        assert!(!LoadMode::FullLoad.is_incremental());
    }
}
