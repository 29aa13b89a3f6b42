pub mod detail;
pub mod listing;


use crate::error::ExtractError;
use crate::fetch::FetchedPage;
use crate::record::Jutsu;
use url::Url;

/// The two kinds of pages this crawl ever touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Paginated index of technique links
    Listing,
    /// A single technique page
    Detail,
}

/// A pending fetch, tagged with how the response should be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Absolute URL to fetch
    pub url: Url,

    /// Which parser handles the response
    pub kind: PageKind,
}

impl CrawlRequest {
    /// Request for a listing page
    pub fn listing(url: Url) -> Self {
        Self {
            url,
            kind: PageKind::Listing,
        }
    }

    /// Request for a detail page
    pub fn detail(url: Url) -> Self {
        Self {
            url,
            kind: PageKind::Detail,
        }
    }
}

/// One unit of parse output: either a finished record or more work
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlYield {
    /// A fully extracted record, ready for the consumer
    Record(Jutsu),

    /// A follow-up fetch discovered on the page
    Follow(CrawlRequest),
}

/// Parse a fetched page according to its kind
pub fn parse_page(page: &FetchedPage, kind: PageKind) -> Result<Vec<CrawlYield>, ExtractError> {
    match kind {
        PageKind::Listing => listing::parse(page),
        PageKind::Detail => detail::parse(page).map(|record| vec![CrawlYield::Record(record)]),
    }
}
