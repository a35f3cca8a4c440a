//! Run configuration
//!
//! Parameters for one extraction run, deserialized from a JSON config file:
//! which endpoints to fetch, the metric date range, an optional account
//! allow-list, the load mode and the API credentials. Base URLs default to
//! the production APIs and are overridable so tests can point the extractor
//! at a mock server.

use crate::error::{Error, Result};
use crate::types::{Endpoint, LoadMode};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Field list requested for locations
///
/// The locations endpoint returns nothing without an explicit read mask.
pub const LOCATIONS_READ_MASK: &str =
    "name,languageCode,storeCode,title,phoneNumbers,categories,storefrontAddress,websiteUri,\
     regularHours,specialHours,serviceArea,latlng,openInfo,metadata,profile,relationshipData";

/// Complete configuration for one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Endpoints to fetch per location
    pub endpoints: Vec<Endpoint>,

    /// Date range for daily metrics
    pub request_range: DateRange,

    /// Optional allow-list of account identifiers (exact match on `name`)
    #[serde(default)]
    pub accounts: Option<Vec<String>>,

    /// Load semantics declared in output manifests
    #[serde(default)]
    pub load_mode: LoadMode,

    /// API credentials
    pub auth: AuthParams,

    /// Base URLs, defaulting to the production APIs
    #[serde(default)]
    pub api: ApiConfig,
}

impl ExtractorConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ),
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration before any fetching
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::invalid_value(
                "endpoints",
                "please select at least one endpoint",
            ));
        }

        if self.request_range.start_date > self.request_range.end_date {
            return Err(Error::invalid_value(
                "request_range",
                "start date cannot exceed end date",
            ));
        }

        for (field, value) in [
            ("api.v1_url", &self.api.v1_url),
            ("api.v4_url", &self.api.v4_url),
            ("api.performance_url", &self.api.performance_url),
            ("api.qanda_url", &self.api.qanda_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::invalid_value(field, format!("invalid URL: {e}")))?;
        }

        Ok(())
    }

    /// Whether an account passes the allow-list
    pub fn account_selected(&self, account_name: &str) -> bool {
        match &self.accounts {
            Some(allowed) => allowed.iter().any(|a| a == account_name),
            None => true,
        }
    }
}

/// Inclusive date range for daily metrics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    pub start_date: NaiveDate,
    /// Last day of the range
    pub end_date: NaiveDate,
}

impl DateRange {
    /// Query parameters for the daily-metrics time-series endpoint
    pub fn daily_range_params(&self) -> Vec<(String, String)> {
        vec![
            (
                "dailyRange.startDate.year".to_string(),
                self.start_date.year().to_string(),
            ),
            (
                "dailyRange.startDate.month".to_string(),
                self.start_date.month().to_string(),
            ),
            (
                "dailyRange.startDate.day".to_string(),
                self.start_date.day().to_string(),
            ),
            (
                "dailyRange.endDate.year".to_string(),
                self.end_date.year().to_string(),
            ),
            (
                "dailyRange.endDate.month".to_string(),
                self.end_date.month().to_string(),
            ),
            (
                "dailyRange.endDate.day".to_string(),
                self.end_date.day().to_string(),
            ),
        ]
    }
}

/// API credentials: either a ready access token or OAuth2 refresh inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthParams {
    /// Use a pre-obtained access token directly
    AccessToken {
        /// The bearer token
        access_token: String,
    },
    /// Exchange a refresh token for an access token at run start
    Oauth {
        /// OAuth2 client id
        client_id: String,
        /// OAuth2 client secret
        client_secret: String,
        /// Long-lived refresh token
        refresh_token: String,
        /// Token endpoint, defaulting to the Google OAuth2 endpoint
        #[serde(default = "default_token_url")]
        token_url: String,
    },
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Base URLs of the upstream APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Account-management API (accounts, locations)
    #[serde(default = "default_v1_url")]
    pub v1_url: String,
    /// Legacy v4 API (reviews, media)
    #[serde(default = "default_v4_url")]
    pub v4_url: String,
    /// Performance API (daily metrics)
    #[serde(default = "default_performance_url")]
    pub performance_url: String,
    /// Q&A API (questions)
    #[serde(default = "default_qanda_url")]
    pub qanda_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            v1_url: default_v1_url(),
            v4_url: default_v4_url(),
            performance_url: default_performance_url(),
            qanda_url: default_qanda_url(),
        }
    }
}

fn default_v1_url() -> String {
    "https://mybusiness.googleapis.com/v1".to_string()
}

fn default_v4_url() -> String {
    "https://mybusiness.googleapis.com/v4".to_string()
}

fn default_performance_url() -> String {
    "https://businessprofileperformance.googleapis.com/v1".to_string()
}

fn default_qanda_url() -> String {
    "https://mybusinessqanda.googleapis.com/v1".to_string()
}

impl ApiConfig {
    /// URL listing all accounts
    pub fn accounts_url(&self) -> String {
        format!("{}/accounts", self.v1_url)
    }

    /// URL listing an account's locations
    pub fn locations_url(&self, account: &str) -> String {
        format!("{}/{account}/locations", self.v1_url)
    }

    /// URL listing a location's reviews
    pub fn reviews_url(&self, account: &str, location: &str) -> String {
        format!("{}/{account}/{location}/reviews", self.v4_url)
    }

    /// URL listing a location's media items
    pub fn media_url(&self, account: &str, location: &str) -> String {
        format!("{}/{account}/{location}/media", self.v4_url)
    }

    /// URL listing a location's questions
    pub fn questions_url(&self, location: &str) -> String {
        format!("{}/{location}/questions", self.qanda_url)
    }

    /// URL of a location's daily-metrics time series
    pub fn daily_metrics_url(&self, location: &str) -> String {
        format!(
            "{}/{location}:getDailyMetricsTimeSeries",
            self.performance_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_config(endpoints: &str, start: &str, end: &str) -> ExtractorConfig {
        serde_json::from_str(&format!(
            r#"{{
                "endpoints": {endpoints},
                "request_range": {{"start_date": "{start}", "end_date": "{end}"}},
                "auth": {{"access_token": "token-1"}}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = base_config(r#"["reviews"]"#, "2024-01-01", "2024-01-31");

        assert_eq!(config.endpoints, vec![Endpoint::Reviews]);
        assert_eq!(config.load_mode, LoadMode::Incremental);
        assert!(config.accounts.is_none());
        assert_eq!(config.api.v1_url, "https://mybusiness.googleapis.com/v1");
        config.validate().unwrap();
    }

    #[test]
    fn test_no_endpoints_is_invalid() {
        let config = base_config("[]", "2024-01-01", "2024-01-31");
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn test_reversed_date_range_is_invalid() {
        let config = base_config(r#"["reviews"]"#, "2024-02-01", "2024-01-01");
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("start date cannot exceed end date"));
    }

    #[test]
    fn test_account_allow_list() {
        let mut config = base_config(r#"["media"]"#, "2024-01-01", "2024-01-31");
        assert!(config.account_selected("accounts/1"));

        config.accounts = Some(vec!["accounts/1".to_string()]);
        assert!(config.account_selected("accounts/1"));
        assert!(!config.account_selected("accounts/2"));
        // Exact match only, no prefix matching
        assert!(!config.account_selected("accounts/10"));
    }

    #[test]
    fn test_daily_range_params() {
        let config = base_config(r#"["dailyMetrics"]"#, "2024-01-05", "2024-02-07");
        let params = config.request_range.daily_range_params();

        assert!(params.contains(&("dailyRange.startDate.year".to_string(), "2024".to_string())));
        assert!(params.contains(&("dailyRange.startDate.month".to_string(), "1".to_string())));
        assert!(params.contains(&("dailyRange.startDate.day".to_string(), "5".to_string())));
        assert!(params.contains(&("dailyRange.endDate.day".to_string(), "7".to_string())));
    }

    #[test]
    fn test_url_builders() {
        let api = ApiConfig::default();
        assert_eq!(
            api.accounts_url(),
            "https://mybusiness.googleapis.com/v1/accounts"
        );
        assert_eq!(
            api.locations_url("accounts/1"),
            "https://mybusiness.googleapis.com/v1/accounts/1/locations"
        );
        assert_eq!(
            api.reviews_url("accounts/1", "locations/2"),
            "https://mybusiness.googleapis.com/v4/accounts/1/locations/2/reviews"
        );
        assert_eq!(
            api.daily_metrics_url("locations/2"),
            "https://businessprofileperformance.googleapis.com/v1/locations/2:getDailyMetricsTimeSeries"
        );
    }

    #[test]
    fn test_oauth_params_parse() {
        let config: ExtractorConfig = serde_json::from_str(
            r#"{
                "endpoints": ["questions"],
                "request_range": {"start_date": "2024-01-01", "end_date": "2024-01-02"},
                "auth": {
                    "client_id": "id",
                    "client_secret": "secret",
                    "refresh_token": "refresh"
                }
            }"#,
        )
        .unwrap();

        match config.auth {
            AuthParams::Oauth { token_url, .. } => {
                assert_eq!(token_url, "https://oauth2.googleapis.com/token");
            }
            AuthParams::AccessToken { .. } => panic!("expected oauth params"),
        }
    }
}
