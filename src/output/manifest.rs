//! Table manifests
//!
//! Every table file is accompanied by a `<table>.csv.manifest` JSON file
//! telling the downstream consumer how to apply the rows: merge by primary
//! key (incremental) or replace the table (full load).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load-semantics manifest written next to each table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Whether rows should be merged into prior state by primary key
    pub incremental: bool,
    /// Columns identifying a row for deduplication
    pub primary_key: Vec<String>,
}

impl Manifest {
    /// Create a manifest for a table
    pub fn new(table: &str, incremental: bool) -> Self {
        Self {
            incremental,
            primary_key: primary_key(table)
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Write the manifest file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string(self)?;
        std::fs::write(path.as_ref(), contents).map_err(|e| Error::Output {
            message: format!(
                "Failed to write manifest {}: {e}",
                path.as_ref().display()
            ),
        })
    }
}

/// Fixed primary-key columns per table
///
/// `name` is the API's opaque resource path and uniquely identifies
/// accounts, locations, reviews, media items and questions. Daily metrics
/// are derived rows keyed by the full pivot triple.
pub fn primary_key(table: &str) -> &'static [&'static str] {
    match table {
        "daily_metrics" => &["location_id", "date", "metric"],
        _ => &["name"],
    }
}
