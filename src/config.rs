use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Index page the walk starts from unless overridden
pub const JUTSU_INDEX_URL: &str =
    "https://naruto.fandom.com/wiki/Special:BrowseData/Jutsu?limit=250&offset=0&_cat=Jutsu";

/// Configuration for the jutsu crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL of the first listing page
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause before each request in milliseconds (0 disables it)
    #[serde(default)]
    pub politeness_delay_ms: u64,

    /// Buffer size of the record stream handed to the consumer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            start_url: default_start_url(),
            max_concurrency: default_max_concurrency(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            politeness_delay_ms: 0,
            channel_capacity: default_channel_capacity(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pause before each request as a Duration
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Default value for start_url
fn default_start_url() -> String {
    JUTSU_INDEX_URL.to_string()
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    4
}

/// Default value for user_agent
fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Default value for request_timeout_secs
fn default_request_timeout_secs() -> u64 {
    30
}

/// Default value for channel_capacity
fn default_channel_capacity() -> usize {
    1024
}
