use super::{CrawlRequest, CrawlYield};
use crate::error::ExtractError;
use crate::fetch::FetchedPage;
use scraper::{Html, Selector};

/// Container holding the links of one index page
const INDEX_CONTAINER: &str = ".smw-columnlist-container";

/// Pagination control pointing at the next index page
const NEXT_PAGE_LINK: &str = "a.mw-nextlink";

/// Parses one listing page into follow-up fetches.
///
/// Every link of the first index container becomes a detail fetch, in
/// document order and without deduplication. The next-page control, if
/// present, becomes a listing fetch queued after the details.
pub fn parse(page: &FetchedPage) -> Result<Vec<CrawlYield>, ExtractError> {
    let doc = Html::parse_document(&page.body);

    let container_selector = Selector::parse(INDEX_CONTAINER).unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();
    let next_selector = Selector::parse(NEXT_PAGE_LINK).unwrap();

    // Only the first container is the index; later matches are ignored
    let container = doc
        .select(&container_selector)
        .next()
        .ok_or(ExtractError::MissingIndexContainer)?;

    let mut yields = Vec::new();

    for href in container
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
    {
        match page.url.join(href) {
            Ok(resolved) => yields.push(CrawlYield::Follow(CrawlRequest::detail(resolved))),
            Err(e) => {
                ::log::warn!("Skipping unresolvable link {:?} on {}: {}", href, page.url, e);
            }
        }
    }

    // First next-control only; absent on the last page
    if let Some(href) = doc
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        match page.url.join(href) {
            Ok(resolved) => yields.push(CrawlYield::Follow(CrawlRequest::listing(resolved))),
            Err(e) => {
                ::log::warn!(
                    "Skipping unresolvable next link {:?} on {}: {}",
                    href,
                    page.url,
                    e
                );
            }
        }
    }

    ::log::debug!("Listing {} yielded {} follow-ups", page.url, yields.len());

    Ok(yields)
}
