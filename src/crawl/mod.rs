pub mod driver;

#[cfg(test)]
mod tests;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::CrawlRequest;
use crate::fetch::Fetcher;
use crate::record::Jutsu;
use crate::stats::{CrawlReport, CrawlStats};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// A running crawl: the record stream plus a handle to the final report
pub struct CrawlSession {
    records: mpsc::Receiver<Jutsu>,
    stats: Arc<CrawlStats>,
    driver: JoinHandle<CrawlReport>,
}

impl CrawlSession {
    /// Receive the next extracted record, or None once the crawl has drained
    pub async fn next_record(&mut self) -> Option<Jutsu> {
        self.records.recv().await
    }

    /// Running counters, readable while the crawl is live
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Wait for the driver to finish and collect the final report.
    ///
    /// Meant to be called once the record stream has drained; calling
    /// it earlier drops unread records and winds the crawl down.
    pub async fn finish(self) -> CrawlReport {
        drop(self.records);

        match self.driver.await {
            Ok(report) => report,
            Err(e) => {
                ::log::error!("Crawl driver task failed: {}", e);
                self.stats.report(None)
            }
        }
    }
}

/// Starts an async crawl and returns a session streaming records as extracted.
///
/// # Arguments
///
/// * `config` - Crawl configuration
/// * `fetcher` - Page fetcher, typically an HttpFetcher
pub fn start<F: Fetcher + 'static>(
    config: CrawlConfig,
    fetcher: F,
) -> Result<CrawlSession, CrawlError> {
    let start_url = Url::parse(&config.start_url)?;

    ::log::info!("Starting jutsu crawl from: {}", start_url);

    let (record_tx, record_rx) = mpsc::channel::<Jutsu>(config.channel_capacity.max(1));
    let stats = Arc::new(CrawlStats::default());

    let driver = tokio::spawn(driver::run(
        config,
        CrawlRequest::listing(start_url),
        Arc::new(fetcher),
        Arc::clone(&stats),
        record_tx,
    ));

    Ok(CrawlSession {
        records: record_rx,
        stats,
        driver,
    })
}
