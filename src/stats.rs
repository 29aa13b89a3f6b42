use crate::error::CrawlError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared between the crawl driver and the session handle
#[derive(Debug, Default)]
pub struct CrawlStats {
    listing_pages: AtomicUsize,
    detail_pages: AtomicUsize,
    links_discovered: AtomicUsize,
    records_emitted: AtomicUsize,
    items_skipped: AtomicUsize,
    fetch_errors: AtomicUsize,
}

impl CrawlStats {
    /// Count a successfully fetched listing page
    pub fn increment_listing_pages(&self) {
        self.listing_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successfully fetched detail page
    pub fn increment_detail_pages(&self) {
        self.detail_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a detail link pulled from an index container
    pub fn increment_links_discovered(&self) {
        self.links_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a record handed to the consumer
    pub fn increment_records_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a detail page that produced no record
    pub fn increment_items_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed fetch
    pub fn increment_fetch_errors(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Listing pages fetched so far
    pub fn listing_pages(&self) -> usize {
        self.listing_pages.load(Ordering::Relaxed)
    }

    /// Detail pages fetched so far
    pub fn detail_pages(&self) -> usize {
        self.detail_pages.load(Ordering::Relaxed)
    }

    /// Detail links discovered so far
    pub fn links_discovered(&self) -> usize {
        self.links_discovered.load(Ordering::Relaxed)
    }

    /// Records emitted so far
    pub fn records_emitted(&self) -> usize {
        self.records_emitted.load(Ordering::Relaxed)
    }

    /// Items skipped so far
    pub fn items_skipped(&self) -> usize {
        self.items_skipped.load(Ordering::Relaxed)
    }

    /// Failed fetches so far
    pub fn fetch_errors(&self) -> usize {
        self.fetch_errors.load(Ordering::Relaxed)
    }

    /// Snapshot the counters into a final report
    pub fn report(&self, walk_error: Option<CrawlError>) -> CrawlReport {
        CrawlReport {
            listing_pages: self.listing_pages(),
            detail_pages: self.detail_pages(),
            links_discovered: self.links_discovered(),
            records_emitted: self.records_emitted(),
            items_skipped: self.items_skipped(),
            fetch_errors: self.fetch_errors(),
            walk_error,
        }
    }
}

/// Final summary of a finished crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Listing pages fetched
    pub listing_pages: usize,

    /// Detail pages fetched
    pub detail_pages: usize,

    /// Detail links discovered across all listing pages
    pub links_discovered: usize,

    /// Records handed to the consumer
    pub records_emitted: usize,

    /// Detail pages that produced no record
    pub items_skipped: usize,

    /// Fetches that failed outright
    pub fetch_errors: usize,

    /// Set when the listing walk halted before running out of pages
    pub walk_error: Option<CrawlError>,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages, {} detail pages, {} links discovered, {} records, {} skipped, {} fetch errors",
            self.listing_pages,
            self.detail_pages,
            self.links_discovered,
            self.records_emitted,
            self.items_skipped,
            self.fetch_errors
        )?;

        if let Some(err) = &self.walk_error {
            write!(f, " (walk halted: {})", err)?;
        }

        Ok(())
    }
}
