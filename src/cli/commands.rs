//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Google Business Profile extractor CLI
#[derive(Parser, Debug)]
#[command(name = "gmb-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory receiving table files and manifests
    #[arg(short, long, default_value = "out/tables")]
    pub output_dir: PathBuf,

    /// Column-set state file, carried between runs
    #[arg(short, long, default_value = "state.json")]
    pub state: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["gmb-extractor", "--config", "config.json"]);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.output_dir, PathBuf::from("out/tables"));
        assert_eq!(cli.state, PathBuf::from("state.json"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "gmb-extractor",
            "-c",
            "cfg.json",
            "-o",
            "/data/out/tables",
            "-s",
            "/data/state.json",
            "-v",
        ]);
        assert_eq!(cli.output_dir, PathBuf::from("/data/out/tables"));
        assert_eq!(cli.state, PathBuf::from("/data/state.json"));
        assert!(cli.verbose);
    }
}
