use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::extract::{self, CrawlRequest, CrawlYield, PageKind};
use crate::fetch::{FetchedPage, Fetcher};
use crate::record::Jutsu;
use crate::stats::{CrawlReport, CrawlStats};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// A finished fetch, still tagged with the request that caused it
type FetchOutcome = (CrawlRequest, Result<FetchedPage, FetchError>);

/// Drives the crawl to completion.
///
/// Owns a FIFO queue of pending requests and a bounded set of in-flight
/// fetches. Each fetched page is parsed for its kind; records go to the
/// consumer, follow-up requests go back on the queue. The loop exits
/// when the queue is empty and nothing is in flight.
pub(crate) async fn run<F: Fetcher + 'static>(
    config: CrawlConfig,
    start: CrawlRequest,
    fetcher: Arc<F>,
    stats: Arc<CrawlStats>,
    records: mpsc::Sender<Jutsu>,
) -> CrawlReport {
    let limit = config.max_concurrency.max(1);
    let delay = config.politeness_delay();

    let mut queue: VecDeque<CrawlRequest> = VecDeque::new();
    queue.push_back(start);

    let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
    let mut walk_error: Option<CrawlError> = None;

    loop {
        // Top up the in-flight set from the queue
        while in_flight.len() < limit {
            let request = match queue.pop_front() {
                Some(request) => request,
                None => break,
            };
            spawn_fetch(&mut in_flight, Arc::clone(&fetcher), request, delay);
        }

        // Nothing queued and nothing in flight: the walk is done
        let joined = match in_flight.join_next().await {
            Some(joined) => joined,
            None => break,
        };

        let (request, outcome) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                ::log::error!("Fetch task failed: {}", e);
                stats.increment_fetch_errors();
                continue;
            }
        };

        match outcome {
            Ok(page) => {
                if !process_fetched_page(
                    &request,
                    &page,
                    &mut queue,
                    &stats,
                    &records,
                    &mut walk_error,
                )
                .await
                {
                    ::log::info!("Record receiver dropped, winding down the crawl");
                    in_flight.shutdown().await;
                    break;
                }
            }
            Err(e) => {
                stats.increment_fetch_errors();
                match request.kind {
                    PageKind::Listing => {
                        ::log::error!("Halting pagination, could not fetch {}: {}", request.url, e);
                        walk_error = Some(CrawlError::ListingFetch {
                            url: request.url,
                            source: e,
                        });
                    }
                    PageKind::Detail => {
                        stats.increment_items_skipped();
                        ::log::warn!("Skipping detail page {}: {}", request.url, e);
                    }
                }
            }
        }
    }

    let report = stats.report(walk_error);
    ::log::info!("Crawl finished: {}", report);
    report
}

/// Spawns one fetch into the in-flight set
fn spawn_fetch<F: Fetcher + 'static>(
    in_flight: &mut JoinSet<FetchOutcome>,
    fetcher: Arc<F>,
    request: CrawlRequest,
    delay: Duration,
) {
    in_flight.spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let outcome = fetcher.fetch(&request.url).await;
        (request, outcome)
    });
}

/// Parses a fetched page and routes its yields.
///
/// Returns false when the consumer has dropped the record stream and
/// the crawl should stop.
async fn process_fetched_page(
    request: &CrawlRequest,
    page: &FetchedPage,
    queue: &mut VecDeque<CrawlRequest>,
    stats: &CrawlStats,
    records: &mpsc::Sender<Jutsu>,
    walk_error: &mut Option<CrawlError>,
) -> bool {
    match request.kind {
        PageKind::Listing => stats.increment_listing_pages(),
        PageKind::Detail => stats.increment_detail_pages(),
    }

    let yields = match extract::parse_page(page, request.kind) {
        Ok(yields) => yields,
        Err(e) => {
            match request.kind {
                PageKind::Listing => {
                    ::log::error!("Halting pagination at {}: {}", page.url, e);
                    *walk_error = Some(CrawlError::ListingExtract {
                        url: request.url.clone(),
                        source: e,
                    });
                }
                PageKind::Detail => {
                    stats.increment_items_skipped();
                    ::log::warn!("Skipping {}: {}", page.url, e);
                }
            }
            return true;
        }
    };

    for step in yields {
        match step {
            CrawlYield::Record(record) => {
                if records.send(record).await.is_err() {
                    return false;
                }
                stats.increment_records_emitted();
            }
            CrawlYield::Follow(next) => {
                ::log::debug!("Queuing {:?} fetch: {}", next.kind, next.url);
                if next.kind == PageKind::Detail {
                    stats.increment_links_discovered();
                }
                queue.push_back(next);
            }
        }
    }

    true
}
