//! # Google Business Profile Extractor
//!
//! Extracts business data (accounts, locations, reviews, media, questions,
//! daily performance metrics) from the Business Profile REST APIs, flattens
//! the nested JSON responses into tabular rows, and writes them as CSV files
//! with manifests describing load semantics.
//!
//! ## Features
//!
//! - **Paginated Extraction**: Follows `nextPageToken` cursors with a
//!   defensive page cap
//! - **Retry/Backoff**: Escalating delays on rate limiting (HTTP 429)
//! - **Soft Failures**: Per-endpoint status allow-lists map errors to
//!   "no data" instead of aborting the run
//! - **Incremental Schemas**: Column sets grow across runs and never shrink,
//!   persisted between runs in a state file
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Extractor                            │
//! │     accounts → locations → reviews/media/questions/metrics   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴──────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │  Paginate   │  Flatten  │   Output    │
//! ├──────────┼───────────┼─────────────┼───────────┼─────────────┤
//! │ OAuth2   │ GET/POST  │ pageToken   │ Nested →  │ CSV         │
//! │ Refresh  │ Retry     │ Page cap    │ flat rows │ Manifest    │
//! │          │ Rate Limit│ Soft errors │ Reshape   │ Column sets │
//! └──────────┴───────────┴─────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the extractor
pub mod error;

/// Common types and type aliases
pub mod types;

/// OAuth2 access-token refresh
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor pagination and response classification
pub mod pagination;

/// Nested JSON flattening
pub mod flatten;

/// Daily-metric time-series reshaping
pub mod reshape;

/// Column-set state persisted between runs
pub mod state;

/// CSV and manifest output
pub mod output;

/// Main extraction engine
pub mod engine;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
