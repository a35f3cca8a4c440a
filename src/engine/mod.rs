//! Main extraction engine
//!
//! Walks the entity hierarchy for one run: accounts, then each account's
//! locations, then the requested per-location endpoints. Records flow
//! through the flattener into explicit run-scoped buffers which the writer
//! drains once per entity; daily metrics take a detour through the
//! reshaper first.
//!
//! Failure semantics: account and location listing errors are fatal; a
//! sub-resource fetch aborts the run only when its status is not soft for
//! that endpoint. Soft failures contribute zero rows and processing moves
//! on to the sibling location.

mod types;

pub use types::RunStats;

use crate::config::{ExtractorConfig, LOCATIONS_READ_MASK};
use crate::error::{Error, Result};
use crate::flatten::flatten;
use crate::http::RequestConfig;
use crate::output::IncrementalWriter;
use crate::pagination::{PagedFetcher, PagedRequest};
use crate::reshape::{reshape, DatedMetrics, LocationMetrics};
use crate::state::ColumnState;
use crate::types::{Endpoint, JsonValue, Row, AVAILABLE_DAILY_METRICS};
use tracing::{error, info, warn};

/// Flattened rows accumulated over the account loop, drained by the writer
/// at the end of the run
#[derive(Default)]
struct RunBuffers {
    locations: Vec<Row>,
    reviews: Vec<Row>,
    media: Vec<Row>,
    questions: Vec<Row>,
    metrics: LocationMetrics,
}

impl RunBuffers {
    fn listing_buffer(&mut self, endpoint: Endpoint) -> &mut Vec<Row> {
        match endpoint {
            Endpoint::Reviews => &mut self.reviews,
            Endpoint::Media => &mut self.media,
            Endpoint::Questions => &mut self.questions,
            Endpoint::DailyMetrics => unreachable!("daily metrics buffer is a time series"),
        }
    }
}

/// Orchestrates one extraction run
pub struct Extractor {
    fetcher: PagedFetcher,
    writer: IncrementalWriter,
    config: ExtractorConfig,
    access_token: String,
}

impl Extractor {
    /// Create an extractor for one run
    pub fn new(
        fetcher: PagedFetcher,
        writer: IncrementalWriter,
        config: ExtractorConfig,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            writer,
            config,
            access_token: access_token.into(),
        }
    }

    /// Run the extraction, draining every buffer through the writer
    ///
    /// The column state is mutated in place; the caller persists it after
    /// the run completes.
    pub async fn run(&self, state: &mut ColumnState) -> Result<RunStats> {
        let mut stats = RunStats::default();

        let accounts = self.list_accounts().await?;
        info!("Accounts found: [{}]", accounts.len());

        let selected: Vec<JsonValue> = accounts
            .into_iter()
            .filter(|account| {
                record_name(account).is_some_and(|name| self.config.account_selected(name))
            })
            .collect();

        if selected.is_empty() {
            return Err(Error::config(
                "no accounts accessible for the authorized user",
            ));
        }
        stats.accounts = selected.len();

        info!("Outputting accounts");
        let account_rows = flatten_records(&selected);
        self.write_table("accounts", &account_rows, state, &mut stats);

        let mut buffers = RunBuffers::default();
        for account in &selected {
            let Some(account_name) = record_name(account) else {
                continue;
            };
            self.process_account(account_name, account, &mut buffers, &mut stats)
                .await?;
        }

        info!("Outputting locations");
        self.write_table("locations", &buffers.locations, state, &mut stats);

        for endpoint in Endpoint::ALL {
            if !self.config.endpoints.contains(&endpoint) {
                continue;
            }
            let rows = match endpoint {
                Endpoint::DailyMetrics => reshape(&buffers.metrics),
                listing => std::mem::take(buffers.listing_buffer(listing)),
            };
            self.write_table(endpoint.table(), &rows, state, &mut stats);
        }

        info!("Extraction finished: {stats}");
        Ok(stats)
    }

    /// Drain one buffer through the writer
    ///
    /// Output errors are logged and do not abort the run; the affected
    /// table may be missing or stale on disk (known gap).
    fn write_table(&self, table: &str, rows: &[Row], state: &mut ColumnState, stats: &mut RunStats) {
        match self.writer.write(table, rows, state) {
            Ok(summary) => stats.record_write(summary.as_ref()),
            Err(e) => error!("Output error for table '{table}': {e}"),
        }
    }

    /// Fetch one account's locations and requested sub-resources into the
    /// run buffers
    async fn process_account(
        &self,
        account_name: &str,
        account: &JsonValue,
        buffers: &mut RunBuffers,
        stats: &mut RunStats,
    ) -> Result<()> {
        let display_name = account
            .get("accountName")
            .and_then(JsonValue::as_str)
            .unwrap_or(account_name);

        let locations = self.list_locations(account_name).await?;
        info!(
            "Locations found in account [{display_name}] - [{}]",
            locations.len()
        );

        if locations.is_empty() {
            warn!("There is no location info under account [{display_name}], skipping");
            return Ok(());
        }
        stats.locations += locations.len();
        buffers.locations.extend(flatten_records(&locations));

        for endpoint in Endpoint::ALL {
            if !self.config.endpoints.contains(&endpoint) {
                continue;
            }
            match endpoint {
                Endpoint::DailyMetrics => {
                    self.extract_daily_metrics(&locations, &mut buffers.metrics)
                        .await?;
                }
                listing => {
                    self.extract_listing(
                        listing,
                        account_name,
                        &locations,
                        buffers.listing_buffer(listing),
                    )
                    .await?;
                }
            }
        }

        Ok(())
    }

    /// Fetch one listing endpoint for every location of an account
    async fn extract_listing(
        &self,
        endpoint: Endpoint,
        account_name: &str,
        locations: &[JsonValue],
        rows: &mut Vec<Row>,
    ) -> Result<()> {
        for location in locations {
            let Some(location_name) = record_name(location) else {
                continue;
            };
            info!(
                "Processing {endpoint} for {}",
                location_title(location, location_name)
            );

            let url = match endpoint {
                Endpoint::Reviews => self.config.api.reviews_url(account_name, location_name),
                Endpoint::Media => self.config.api.media_url(account_name, location_name),
                Endpoint::Questions => self.config.api.questions_url(location_name),
                Endpoint::DailyMetrics => unreachable!("handled by extract_daily_metrics"),
            };

            let request = PagedRequest::new(endpoint.table(), url, endpoint.records_field())
                .query("access_token", &self.access_token);

            let records = self.fetcher.fetch_all(&request).await?;
            rows.extend(flatten_records(&records));
        }

        Ok(())
    }

    /// Fetch the daily-metric time series for every location of an account
    async fn extract_daily_metrics(
        &self,
        locations: &[JsonValue],
        per_location: &mut LocationMetrics,
    ) -> Result<()> {
        for location in locations {
            let Some(location_name) = record_name(location) else {
                continue;
            };
            info!(
                "Processing endpoint dailyMetrics for {}",
                location_title(location, location_name)
            );

            let dated = self.fetch_location_metrics(location_name).await?;
            let location_id = location_name
                .strip_prefix("locations/")
                .unwrap_or(location_name);
            per_location.insert(location_id.to_string(), dated);
        }

        Ok(())
    }

    /// One time-series request per metric for a single location
    async fn fetch_location_metrics(&self, location_name: &str) -> Result<DatedMetrics> {
        let url = self.config.api.daily_metrics_url(location_name);
        let mut dated = DatedMetrics::new();

        for metric in AVAILABLE_DAILY_METRICS {
            info!("Fetching metric: {metric}");

            let mut request = RequestConfig::new()
                .query("dailyMetric", metric)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.access_token));
            for (key, value) in self.config.request_range.daily_range_params() {
                request = request.query(key, value);
            }

            let Some(body) = self
                .fetcher
                .fetch_one("daily_metrics", &url, request)
                .await?
            else {
                continue;
            };

            let Some(dated_values) = body
                .get("timeSeries")
                .and_then(|series| series.get("datedValues"))
                .and_then(JsonValue::as_array)
            else {
                info!("Metric {metric} did not return any time series");
                continue;
            };

            for dated_value in dated_values {
                let Some(date) = format_date(dated_value.get("date")) else {
                    continue;
                };
                let value = metric_value(dated_value.get("value"));
                dated
                    .entry(date)
                    .or_default()
                    .insert(metric.to_string(), value);
            }
        }

        Ok(dated)
    }

    async fn list_accounts(&self) -> Result<Vec<JsonValue>> {
        let request = PagedRequest::new("accounts", self.config.api.accounts_url(), "accounts")
            .query("access_token", &self.access_token);

        self.fetcher.fetch_all(&request).await
    }

    async fn list_locations(&self, account_name: &str) -> Result<Vec<JsonValue>> {
        let request = PagedRequest::new(
            "locations",
            self.config.api.locations_url(account_name),
            "locations",
        )
        .query("access_token", &self.access_token)
        .query("readMask", LOCATIONS_READ_MASK);

        self.fetcher.fetch_all(&request).await
    }
}

/// Flatten every object record, skipping non-object entries
fn flatten_records(records: &[JsonValue]) -> Vec<Row> {
    records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(flatten)
        .collect()
}

fn record_name(record: &JsonValue) -> Option<&str> {
    record.get("name").and_then(JsonValue::as_str)
}

fn location_title<'a>(location: &'a JsonValue, fallback: &'a str) -> &'a str {
    location
        .get("title")
        .and_then(JsonValue::as_str)
        .unwrap_or(fallback)
}

/// `YYYY-MM-DD` from a `{year, month, day}` date object
fn format_date(date: Option<&JsonValue>) -> Option<String> {
    let date = date?;
    let year = date.get("year")?.as_i64()?;
    let month = date.get("month")?.as_i64()?;
    let day = date.get("day")?.as_i64()?;
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

/// Metric values arrive as strings; absence means zero
fn metric_value(value: Option<&JsonValue>) -> i64 {
    match value {
        Some(JsonValue::String(s)) => s.parse().unwrap_or(0),
        Some(JsonValue::Number(n)) => n.as_i64().unwrap_or(0),
        _ => 0,
    }
}
