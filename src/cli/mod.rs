//! CLI module
//!
//! Command-line interface for running an extraction: parse arguments, load
//! and validate the config, resolve the access token, run the engine and
//! persist the column state.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
