//! CLI runner - wires the components for one run

use crate::auth::resolve_access_token;
use crate::cli::commands::Cli;
use crate::config::ExtractorConfig;
use crate::engine::Extractor;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::output::IncrementalWriter;
use crate::pagination::PagedFetcher;
use crate::state::StateManager;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Execute the extraction run
    pub async fn run(&self) -> Result<()> {
        info!("Running {} {}", crate::NAME, crate::VERSION);
        info!("Loading configuration from {}", self.cli.config.display());

        let config = ExtractorConfig::from_file(&self.cli.config)?;
        config.validate()?;
        info!(
            "Request range: {} to {}",
            config.request_range.start_date, config.request_range.end_date
        );

        let http = HttpClient::with_config(HttpClientConfig::default());
        let access_token = resolve_access_token(http.inner(), &config.auth).await?;

        let state_manager = StateManager::new(&self.cli.state);
        let mut state = state_manager.load()?;

        let writer = IncrementalWriter::new(&self.cli.output_dir, config.load_mode);
        let extractor = Extractor::new(PagedFetcher::new(http), writer, config, access_token);

        let stats = extractor.run(&mut state).await?;
        state_manager.save(&state)?;

        info!("Run complete: {stats}");
        Ok(())
    }
}
