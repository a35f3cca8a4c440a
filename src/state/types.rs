//! Column-set state types
//!
//! Serialized to JSON and persisted between runs as a plain
//! `table name -> [column, ...]` mapping.

use crate::types::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered column sets per table, append-only within and across runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnState {
    tables: IndexMap<String, Vec<String>>,
}

impl ColumnState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Known columns for a table, if any prior run has written it
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Tables with known column sets
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Compute the output column order for a batch of rows
    ///
    /// Persisted columns come first, in their original order; columns seen
    /// only in `rows` are appended in first-seen order. The set never
    /// shrinks: persisted columns stay even when absent from every row.
    pub fn merged_columns(&self, table: &str, rows: &[Row]) -> Vec<String> {
        let mut columns: Vec<String> = self
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default();

        for row in rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Record the column set used for a table
    ///
    /// Existing columns keep their position; new ones are appended.
    pub fn update(&mut self, table: &str, columns: &[String]) {
        let known = self.tables.entry(table.to_string()).or_default();
        for column in columns {
            if !known.iter().any(|c| c == column) {
                known.push(column.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JsonValue;
    use pretty_assertions::assert_eq;

    fn row(keys: &[&str]) -> Row {
        keys.iter()
            .map(|k| ((*k).to_string(), JsonValue::from(1)))
            .collect()
    }

    #[test]
    fn test_merged_columns_first_seen_order() {
        let state = ColumnState::new();
        let rows = vec![row(&["a", "b"]), row(&["b", "c"])];
        assert_eq!(state.merged_columns("t", &rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merged_columns_persisted_order_wins() {
        let mut state = ColumnState::new();
        state.update("t", &["x".to_string(), "y".to_string()]);

        let rows = vec![row(&["z", "x"])];
        assert_eq!(state.merged_columns("t", &rows), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_column_set_never_shrinks() {
        let mut state = ColumnState::new();
        state.update("t", &["a".to_string(), "b".to_string()]);
        state.update("t", &["c".to_string()]);

        assert_eq!(
            state.columns("t").unwrap(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut state = ColumnState::new();
        state.update("t", &["a".to_string()]);
        state.update("t", &["a".to_string()]);
        assert_eq!(state.columns("t").unwrap(), &["a".to_string()]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut state = ColumnState::new();
        state.update("accounts", &["name".to_string(), "type".to_string()]);

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"accounts":["name","type"]}"#);

        let restored: ColumnState = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.columns("accounts").unwrap(),
            &["name".to_string(), "type".to_string()]
        );
    }
}
