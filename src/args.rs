use clap::Parser;
use jutsu_scrape::CrawlConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jutsu-scrape")]
#[command(about = "Walks the jutsu wiki index and extracts one record per technique page")]
#[command(version)]
pub struct Args {
    /// Listing page to start from (defaults to the jutsu index)
    #[arg(long)]
    pub start_url: Option<String>,

    /// Number of concurrent page fetches (default 4)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// File to write records to, one JSON object per line
    #[arg(short, long, default_value = "jutsus.jsonl")]
    pub output: PathBuf,

    /// Optional JSON config file; flags given on the command line override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pause before each request in milliseconds (default 0)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds (default 30)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Args {
    /// Resolve the final crawl configuration from the optional file plus flag overrides
    pub fn into_config(self) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::new(),
        };

        if let Some(start_url) = self.start_url {
            config.start_url = start_url;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.politeness_delay_ms = delay_ms;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }

        Ok(config)
    }
}
