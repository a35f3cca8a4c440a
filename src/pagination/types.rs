//! Pagination types
//!
//! The Business Profile APIs share one pagination pattern: a `nextPageToken`
//! field in the response body, echoed back as the `pageToken` query
//! parameter. Absence of the token signals the final page.

use crate::types::Method;
use std::collections::HashMap;

/// Query parameter carrying the continuation token
pub const PAGE_TOKEN_PARAM: &str = "pageToken";

/// Response field carrying the continuation token
pub const NEXT_PAGE_TOKEN_FIELD: &str = "nextPageToken";

/// Defensive bound on pages followed per logical fetch
///
/// The upstream API guarantees termination; the cap only bounds the loop
/// against a misbehaving server echoing tokens forever.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// A paginated API request
///
/// Describes everything needed to fetch one entity collection: the URL, the
/// query/header set sent with every page, and the name of the response field
/// holding the records array.
#[derive(Debug, Clone)]
pub struct PagedRequest {
    /// Endpoint label used for logging and error classification
    pub endpoint: String,
    /// Full request URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Query parameters sent with every page
    pub query: Vec<(String, String)>,
    /// Headers sent with every page
    pub headers: HashMap<String, String>,
    /// Response field holding the records array
    pub records_field: String,
}

impl PagedRequest {
    /// Create a GET request for the given endpoint
    pub fn new(
        endpoint: impl Into<String>,
        url: impl Into<String>,
        records_field: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            url: url.into(),
            method: Method::GET,
            query: Vec::new(),
            headers: HashMap::new(),
            records_field: records_field.into(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// One fetched page
#[derive(Debug)]
pub enum PageOutcome {
    /// A successful page of records, with the continuation token if any
    Page {
        /// Records extracted from the configured field
        records: Vec<serde_json::Value>,
        /// Continuation token for the next page, absent on the final page
        next_token: Option<String>,
    },
    /// A status the policy classifies as "no data" for this unit
    Soft {
        /// The status that was softened
        status: u16,
    },
}

/// Per-endpoint soft-failure classification
///
/// Some endpoints report expected conditions through error statuses: an
/// unverified location answers 403 on the performance API, questions come
/// back 400 for locations without Q&A. Statuses listed here for an endpoint
/// are logged and treated as an empty result instead of aborting the run.
#[derive(Debug, Clone, Default)]
pub struct SoftFailurePolicy {
    statuses: HashMap<String, Vec<u16>>,
}

impl SoftFailurePolicy {
    /// Create an empty policy (every non-200 is fatal)
    pub fn none() -> Self {
        Self::default()
    }

    /// Policy matching the upstream API's observed behavior
    pub fn standard() -> Self {
        Self::none()
            .soften("daily_metrics", &[400, 403, 500])
            .soften("questions", &[400, 403, 500])
    }

    /// Mark statuses as soft for an endpoint
    #[must_use]
    pub fn soften(mut self, endpoint: impl Into<String>, statuses: &[u16]) -> Self {
        self.statuses
            .entry(endpoint.into())
            .or_default()
            .extend_from_slice(statuses);
        self
    }

    /// Check whether a status is soft for the given endpoint
    pub fn is_soft(&self, endpoint: &str, status: u16) -> bool {
        self.statuses
            .get(endpoint)
            .is_some_and(|s| s.contains(&status))
    }
}
