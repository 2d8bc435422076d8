//! HTTP fetch capability
//!
//! The scheduler depends only on the `Fetch` contract: given an article
//! path, return the extracted links and a word count, or a failure flag.
//! Fetching never raises: every transport or status error is folded into
//! `success: false` so the scheduler handles all results uniformly.

use crate::config::FETCH_TIMEOUT;
use crate::crawler::parser::parse_article;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Result of fetching one article path
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Valid, topic-filtered outbound article paths
    pub links: Vec<String>,

    /// Rough word count of the article body
    pub word_count: usize,

    /// False for any transport error, timeout, or non-2xx status
    pub success: bool,
}

impl FetchOutcome {
    /// A failed fetch: no links, zero count.
    pub fn failure() -> Self {
        Self {
            links: Vec::new(),
            word_count: 0,
            success: false,
        }
    }
}

/// Capability consumed by the scheduler: fetch a path, report the outcome.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, path: &str, topics: &[String]) -> FetchOutcome;
}

/// Production fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Builds a fetcher rooted at `base` with the fixed request timeout.
    pub fn new(base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("warren/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base: Url::parse(base)?,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, path: &str, topics: &[String]) -> FetchOutcome {
        let full_url = match self.base.join(path) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Unresolvable path {}: {}", path, e);
                return FetchOutcome::failure();
            }
        };

        let response = match self.client.get(full_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", full_url, e);
                return FetchOutcome::failure();
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", full_url, e);
                return FetchOutcome::failure();
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", full_url, e);
                return FetchOutcome::failure();
            }
        };

        let parsed = parse_article(&body, topics);
        FetchOutcome {
            links: parsed.links,
            word_count: parsed.word_count,
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fetcher() {
        assert!(HttpFetcher::new("https://en.wikipedia.org").is_ok());
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(HttpFetcher::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unresolvable_path_is_a_failure_not_an_error() {
        let fetcher = HttpFetcher::new("https://en.wikipedia.org").unwrap();
        // A path the base cannot absorb still yields a uniform outcome
        let outcome = fetcher.fetch("http://[invalid", &[]).await;
        assert!(!outcome.success);
        assert!(outcome.links.is_empty());
    }
}
