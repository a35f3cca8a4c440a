//! Cursor pagination and response classification
//!
//! # Overview
//!
//! [`PagedFetcher`] drives the fetch loop for one entity collection: issue
//! the request, classify the status, extract the records array, follow the
//! `nextPageToken` cursor until it is absent. The loop is iterative with an
//! explicit accumulator and a defensive page cap, so a misbehaving server
//! cannot grow the call stack or loop forever.

mod types;

pub use types::{
    PageOutcome, PagedRequest, SoftFailurePolicy, DEFAULT_MAX_PAGES, NEXT_PAGE_TOKEN_FIELD,
    PAGE_TOKEN_PARAM,
};

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::JsonValue;
use tracing::{debug, warn};

/// Fetches paginated entity collections
#[derive(Debug)]
pub struct PagedFetcher {
    client: HttpClient,
    policy: SoftFailurePolicy,
    max_pages: usize,
}

impl PagedFetcher {
    /// Create a fetcher with the standard soft-failure policy
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            policy: SoftFailurePolicy::standard(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Replace the soft-failure policy
    #[must_use]
    pub fn with_policy(mut self, policy: SoftFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the defensive page cap
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The soft-failure policy in effect
    pub fn policy(&self) -> &SoftFailurePolicy {
        &self.policy
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetch a single page
    ///
    /// Statuses listed as soft for this endpoint produce
    /// [`PageOutcome::Soft`]; any other non-200 status is a fatal
    /// [`Error::Extraction`].
    pub async fn fetch_page(
        &self,
        request: &PagedRequest,
        page_token: Option<&str>,
    ) -> Result<PageOutcome> {
        let mut config = RequestConfig::new();
        for (key, value) in &request.query {
            config = config.query(key, value);
        }
        for (key, value) in &request.headers {
            config = config.header(key, value);
        }
        if let Some(token) = page_token {
            config = config.query(PAGE_TOKEN_PARAM, token);
        }

        let response = self
            .client
            .request(request.method.into(), &request.url, config)
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            if self.policy.is_soft(&request.endpoint, status) {
                warn!(
                    "Endpoint '{}' returned HTTP {} for {}, treating as no data",
                    request.endpoint, status, request.url
                );
                return Ok(PageOutcome::Soft { status });
            }
            return Err(Error::extraction(&request.endpoint, status, body));
        }

        let body: JsonValue = response.json().await.map_err(Error::Http)?;

        let records = match body.get(&request.records_field) {
            Some(JsonValue::Array(items)) => items.clone(),
            Some(other) => {
                warn!(
                    "Endpoint '{}': field '{}' is not an array ({}), treating as empty",
                    request.endpoint,
                    request.records_field,
                    type_name(other)
                );
                Vec::new()
            }
            None => {
                debug!(
                    "Endpoint '{}': response has no '{}' field",
                    request.endpoint, request.records_field
                );
                Vec::new()
            }
        };

        let next_token = body
            .get(NEXT_PAGE_TOKEN_FIELD)
            .and_then(JsonValue::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(PageOutcome::Page {
            records,
            next_token,
        })
    }

    /// Fetch a single unpaginated JSON document
    ///
    /// Used for endpoints answering one document instead of a record array
    /// (the daily-metrics time series). Returns `None` when the status is
    /// soft for this endpoint.
    pub async fn fetch_one(
        &self,
        endpoint: &str,
        url: &str,
        config: RequestConfig,
    ) -> Result<Option<JsonValue>> {
        let response = self
            .client
            .request(reqwest::Method::GET, url, config)
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            if self.policy.is_soft(endpoint, status) {
                warn!(
                    "Endpoint '{endpoint}' returned HTTP {status} for {url}, treating as no data"
                );
                return Ok(None);
            }
            return Err(Error::extraction(endpoint, status, body));
        }

        let body: JsonValue = response.json().await.map_err(Error::Http)?;
        Ok(Some(body))
    }

    /// Fetch every page of an entity collection, in page order
    ///
    /// A soft failure ends the loop with whatever was collected so far
    /// (an empty result when the first page fails soft).
    pub async fn fetch_all(&self, request: &PagedRequest) -> Result<Vec<JsonValue>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            if pages >= self.max_pages {
                warn!(
                    "Endpoint '{}' hit the page cap ({}) at {} records, stopping",
                    request.endpoint,
                    self.max_pages,
                    records.len()
                );
                break;
            }

            match self.fetch_page(request, page_token.as_deref()).await? {
                PageOutcome::Soft { .. } => break,
                PageOutcome::Page {
                    records: page_records,
                    next_token,
                } => {
                    pages += 1;
                    debug!(
                        "Endpoint '{}': page {} with {} records",
                        request.endpoint,
                        pages,
                        page_records.len()
                    );
                    records.extend(page_records);

                    match next_token {
                        Some(token) => page_token = Some(token),
                        None => break,
                    }
                }
            }
        }

        Ok(records)
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
