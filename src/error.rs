use thiserror::Error;
use url::Url;

/// Failures while pulling structure out of a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A listing page had no index container to read links from
    #[error("listing page has no index container")]
    MissingIndexContainer,

    /// A detail page had no title element
    #[error("detail page has no title element")]
    MissingTitle,

    /// A detail page had no content container
    #[error("detail page has no content container")]
    MissingContent,
}

/// Transport-level failures while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request itself failed (connect, timeout, body read)
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected status {status} for {url}")]
    Status { status: reqwest::StatusCode, url: Url },
}

/// Failures that end or prevent a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The configured start URL did not parse
    #[error("invalid start url: {0}")]
    InvalidStartUrl(#[from] url::ParseError),

    /// The HTTP client could not be built
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),

    /// A listing page could not be fetched, breaking the pagination chain
    #[error("listing walk halted, could not fetch {url}: {source}")]
    ListingFetch { url: Url, source: FetchError },

    /// A listing page could not be read, breaking the pagination chain
    #[error("listing walk halted at {url}: {source}")]
    ListingExtract { url: Url, source: ExtractError },
}
