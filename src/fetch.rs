use crate::config::CrawlConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use url::Url;

/// A fetched page: the final URL after redirects plus the raw body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the body was actually served from
    pub url: Url,

    /// Raw HTML body
    pub body: String,
}

/// Fetches pages for the crawl driver.
///
/// Kept as a trait so the driver can be exercised against canned
/// pages without touching the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single page
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Production fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the HTTP client from the crawl configuration
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(5))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        ::log::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.clone(),
            });
        }

        // Keep the post-redirect URL so relative links resolve correctly
        let final_url = response.url().clone();
        let body = response.text().await?;

        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}
