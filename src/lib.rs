// Re-export modules
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod record;
pub mod stats;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use crawl::CrawlSession;
pub use error::{CrawlError, ExtractError, FetchError};
pub use record::Jutsu;
pub use stats::CrawlReport;

use fetch::HttpFetcher;

/// Main builder for running a jutsu crawl
pub struct Harvest {
    config: CrawlConfig,
}

impl Harvest {
    /// Create a new Harvest builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlConfig::new(),
        }
    }

    /// Use an already-built configuration
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Override the listing page the walk starts from
    pub fn with_start_url(mut self, url: &str) -> Self {
        self.config.start_url = url.to_string();
        self
    }

    /// Set the maximum number of concurrent page fetches
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the pause before each request in milliseconds
    pub fn with_politeness_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.politeness_delay_ms = delay_ms;
        self
    }

    /// Start the crawl over HTTP and get the session handle
    pub fn run(self) -> Result<CrawlSession, CrawlError> {
        let fetcher = HttpFetcher::new(&self.config)?;
        crawl::start(self.config, fetcher)
    }
}

impl Default for Harvest {
    fn default() -> Self {
        Self::new()
    }
}
