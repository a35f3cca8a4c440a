//! State manager implementation
//!
//! File-based persistence for the column-set state. The run holds a single
//! mutable `ColumnState`; the manager only loads it at run start and writes
//! it back atomically (temp file, then rename) at run end.

use super::types::ColumnState;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Loads and persists column-set state
#[derive(Debug)]
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// Create a state manager for the given file path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load state from the file, or an empty state when absent
    pub fn load(&self) -> Result<ColumnState> {
        if !self.path.exists() {
            return Ok(ColumnState::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;

        serde_json::from_str(&contents).map_err(|e| Error::State {
            message: format!("Failed to parse state file: {e}"),
        })
    }

    /// Persist state, replacing the file atomically
    pub fn save(&self, state: &ColumnState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::State {
                    message: format!("Failed to create state directory: {e}"),
                })?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &contents).map_err(|e| Error::State {
            message: format!("Failed to write state file: {e}"),
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| Error::State {
            message: format!("Failed to rename state file: {e}"),
        })?;

        Ok(())
    }

    /// Path of the underlying state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
