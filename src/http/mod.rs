//! HTTP client module
//!
//! Provides the HTTP layer used by all extraction calls:
//!
//! - **Automatic Retries**: Rate-limit (429) and transport failures retry
//!   with an escalating delay schedule
//! - **Rate Limiting**: Token bucket request pacing using governor
//! - **Classification**: Non-retryable statuses are returned to the caller,
//!   which decides between fatal and soft handling per endpoint

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
