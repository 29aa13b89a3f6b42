use super::start;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::fetch::{FetchedPage, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Serves canned bodies and records every URL fetched
struct CannedFetcher {
    pages: HashMap<String, String>,
    hits: Arc<Mutex<Vec<String>>>,
    active: AtomicUsize,
    peak: Arc<AtomicUsize>,
    latency: Duration,
}

impl CannedFetcher {
    fn new(pages: Vec<(&str, String)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
            hits: Arc::new(Mutex::new(Vec::new())),
            active: AtomicUsize::new(0),
            peak: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
        }
    }

    /// Adds a fixed delay to every fetch so fetches can overlap
    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Handle on the fetch log that survives handing the fetcher over
    fn hit_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.hits)
    }

    /// Handle on the in-flight high-water mark
    fn peak_in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.hits.lock().unwrap().push(url.to_string());

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outcome = match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedPage {
                url: url.clone(),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                url: url.clone(),
            }),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

fn listing_page(links: &[&str], next: Option<&str>) -> String {
    let mut anchors = String::new();
    for link in links {
        anchors.push_str(&format!("<a href=\"{}\">{}</a>", link, link));
    }

    let next_link = match next {
        Some(href) => format!("<a class=\"mw-nextlink\" href=\"{}\">Next</a>", href),
        None => String::new(),
    };

    format!(
        "<html><body><div class=\"smw-columnlist-container\">{}</div>{}</body></html>",
        anchors, next_link
    )
}

fn detail_page(title: &str, body: &str) -> String {
    format!(
        "<html><body><span class=\"mw-page-title-main\">{}</span><div class=\"mw-parser-output\"><p>{}</p></div></body></html>",
        title, body
    )
}

fn test_config(concurrency: usize) -> CrawlConfig {
    let mut config = CrawlConfig::new();
    config.start_url = "https://wiki.test/index".to_string();
    config.max_concurrency = concurrency;
    config
}

#[tokio::test]
async fn test_two_page_walk_fetches_each_page_once() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B"], Some("/index2")),
        ),
        ("https://wiki.test/index2", listing_page(&["/wiki/C"], None)),
        (
            "https://wiki.test/wiki/A",
            detail_page("Technique A", "First body."),
        ),
        (
            "https://wiki.test/wiki/B",
            detail_page("Technique B", "Second body."),
        ),
        (
            "https://wiki.test/wiki/C",
            detail_page("Technique C", "Third body."),
        ),
    ]);
    let hits = fetcher.hit_log();

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique B", "Technique C"]);
    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.detail_pages, 3);
    assert_eq!(report.records_emitted, 3);
    assert_eq!(report.items_skipped, 0);
    assert_eq!(report.fetch_errors, 0);
    assert!(report.walk_error.is_none());

    // Page one's details go out before its next page is followed,
    // and no page is ever fetched twice
    let fetched = hits.lock().unwrap();
    assert_eq!(
        *fetched,
        [
            "https://wiki.test/index",
            "https://wiki.test/wiki/A",
            "https://wiki.test/wiki/B",
            "https://wiki.test/index2",
            "https://wiki.test/wiki/C",
        ]
    );
}

#[tokio::test]
async fn test_concurrent_fetches_emit_every_record() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B", "/wiki/C", "/wiki/D", "/wiki/E"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/B", detail_page("Technique B", "Body.")),
        ("https://wiki.test/wiki/C", detail_page("Technique C", "Body.")),
        ("https://wiki.test/wiki/D", detail_page("Technique D", "Body.")),
        ("https://wiki.test/wiki/E", detail_page("Technique E", "Body.")),
    ]);
    let hits = fetcher.hit_log();

    let mut session = start(test_config(4), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    // Completion order is not fixed under concurrency, the set is
    names.sort();
    assert_eq!(
        names,
        [
            "Technique A",
            "Technique B",
            "Technique C",
            "Technique D",
            "Technique E",
        ]
    );
    assert_eq!(report.records_emitted, 5);
    assert_eq!(report.links_discovered, 5);
    assert!(report.walk_error.is_none());
    assert_eq!(hits.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_duplicate_links_fetch_twice() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/A"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
    ]);
    let hits = fetcher.hit_log();

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique A"]);
    assert_eq!(report.links_discovered, 2);
    assert_eq!(report.records_emitted, 2);

    let fetched = hits.lock().unwrap();
    let hits_for_a = fetched
        .iter()
        .filter(|url| url.as_str() == "https://wiki.test/wiki/A")
        .count();
    assert_eq!(hits_for_a, 2, "duplicate link must be fetched twice");
}

#[tokio::test]
async fn test_detail_fetch_failure_skips_only_that_item() {
    // B has no canned body and comes back as a 404
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B", "/wiki/C"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/C", detail_page("Technique C", "Body.")),
    ]);

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique C"]);
    assert_eq!(report.items_skipped, 1);
    assert_eq!(report.fetch_errors, 1);
    assert_eq!(report.detail_pages, 2);
    assert!(report.walk_error.is_none());
}

#[tokio::test]
async fn test_detail_missing_title_skips_only_that_item() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B", "/wiki/C"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        (
            "https://wiki.test/wiki/B",
            "<html><body><div class=\"mw-parser-output\"><p>No title here.</p></div></body></html>"
                .to_string(),
        ),
        ("https://wiki.test/wiki/C", detail_page("Technique C", "Body.")),
    ]);

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique C"]);
    assert_eq!(report.items_skipped, 1);
    assert_eq!(report.fetch_errors, 0);
    assert_eq!(report.detail_pages, 3);
    assert!(report.walk_error.is_none());
}

#[tokio::test]
async fn test_halted_listing_still_drains_discovered_details() {
    // The second index page lost its container entirely
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B"], Some("/index2")),
        ),
        (
            "https://wiki.test/index2",
            "<html><body><p>maintenance</p></body></html>".to_string(),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/B", detail_page("Technique B", "Body.")),
    ]);

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique B"]);
    assert_eq!(report.records_emitted, 2);
    assert!(matches!(
        report.walk_error,
        Some(CrawlError::ListingExtract { .. })
    ));
}

#[tokio::test]
async fn test_halted_listing_fetch_failure_is_surfaced() {
    // The second index page 404s, breaking the pagination chain
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B"], Some("/index2")),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/B", detail_page("Technique B", "Body.")),
    ]);

    let mut session = start(test_config(1), fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A", "Technique B"]);
    assert_eq!(report.listing_pages, 1);
    assert_eq!(report.fetch_errors, 1);
    assert!(matches!(
        report.walk_error,
        Some(CrawlError::ListingFetch { .. })
    ));
}

#[tokio::test]
async fn test_concurrency_limit_bounds_in_flight_fetches() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(
                &[
                    "/wiki/A", "/wiki/B", "/wiki/C", "/wiki/D", "/wiki/E", "/wiki/F",
                ],
                None,
            ),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/B", detail_page("Technique B", "Body.")),
        ("https://wiki.test/wiki/C", detail_page("Technique C", "Body.")),
        ("https://wiki.test/wiki/D", detail_page("Technique D", "Body.")),
        ("https://wiki.test/wiki/E", detail_page("Technique E", "Body.")),
        ("https://wiki.test/wiki/F", detail_page("Technique F", "Body.")),
    ])
    .with_latency(Duration::from_millis(50));
    let peak = fetcher.peak_in_flight();

    let mut session = start(test_config(2), fetcher).unwrap();

    while session.next_record().await.is_some() {}
    let report = session.finish().await;

    assert_eq!(report.records_emitted, 6);
    assert!(report.walk_error.is_none());

    // The limit is saturated but never exceeded
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 2, "in-flight fetches exceeded the limit: {}", peak);
    assert_eq!(peak, 2, "fetches never overlapped");
}

#[tokio::test]
async fn test_zero_channel_capacity_still_crawls() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
    ]);

    // Capacity zero is clamped rather than handed to the channel
    let mut config = test_config(1);
    config.channel_capacity = 0;

    let mut session = start(config, fetcher).unwrap();

    let mut names = Vec::new();
    while let Some(record) = session.next_record().await {
        names.push(record.name);
    }
    let report = session.finish().await;

    assert_eq!(names, ["Technique A"]);
    assert_eq!(report.records_emitted, 1);
    assert!(report.walk_error.is_none());
}

#[tokio::test]
async fn test_finish_before_draining_winds_the_crawl_down() {
    let fetcher = CannedFetcher::new(vec![
        (
            "https://wiki.test/index",
            listing_page(&["/wiki/A", "/wiki/B", "/wiki/C", "/wiki/D", "/wiki/E"], None),
        ),
        ("https://wiki.test/wiki/A", detail_page("Technique A", "Body.")),
        ("https://wiki.test/wiki/B", detail_page("Technique B", "Body.")),
        ("https://wiki.test/wiki/C", detail_page("Technique C", "Body.")),
        ("https://wiki.test/wiki/D", detail_page("Technique D", "Body.")),
        ("https://wiki.test/wiki/E", detail_page("Technique E", "Body.")),
    ]);

    let mut config = test_config(1);
    config.channel_capacity = 1;

    let mut session = start(config, fetcher).unwrap();

    let first = session.next_record().await;
    assert!(first.is_some());

    // Remaining records are abandoned; the driver must still settle
    let report = session.finish().await;

    assert!(report.records_emitted < 5);
    assert!(report.walk_error.is_none());
}
