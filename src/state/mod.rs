//! Column-set state persisted between runs
//!
//! Incremental loading needs stable output schemas: a column that appeared
//! in any prior run must keep its place in the header even when the current
//! run's records lack it. The state file records the ordered column set per
//! table; it is read once at run start and written once at run end.
//!
//! # Overview
//!
//! - `ColumnState` - ordered, append-only column sets per table
//! - `StateManager` - file-based persistence with atomic writes

mod manager;
mod types;

pub use manager::StateManager;
pub use types::ColumnState;
