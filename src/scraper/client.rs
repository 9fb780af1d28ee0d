//! HTTP fetcher for timataka.net.
//!
//! Certificate validation is deliberately disabled: the source host has been
//! observed serving a broken TLS chain, and without this relaxation every
//! scrape fails outright. This is a trust decision scoped to a single
//! read-only source, not a general-purpose client.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::retry::{retry, RetryConfig};

/// Browser-like identification to avoid trivial bot-blocking.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default per-request timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shorter timeout for liveness probes and alternate-URL trials.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client wrapper with retry and backoff
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl Fetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            retry: RetryConfig::default(),
        })
    }

    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<String, ScrapeError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetch a page, retrying transient failures with exponential backoff.
    /// Client errors (4xx) fail immediately; after the retry budget is spent
    /// the last observed error is returned.
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("fetching {}", url);
        retry(&self.retry, url, ScrapeError::is_transient, || {
            self.fetch_once(url, FETCH_TIMEOUT)
        })
        .await
    }

    /// Try a list of candidate URLs in order with a short timeout each,
    /// returning the first successful body.
    pub async fn fetch_first(&self, urls: &[String]) -> Result<String, ScrapeError> {
        let mut last_error = None;
        for url in urls {
            match self.fetch_once(url, PROBE_TIMEOUT).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("alternate URL {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| ScrapeError::EmptyExtraction("no URLs given".into())))
    }

    /// Lightweight single-attempt check of whether the host answers at all.
    pub async fn probe(&self, url: &str) -> bool {
        match self.fetch_once(url, PROBE_TIMEOUT).await {
            Ok(_) => true,
            Err(e) => {
                warn!("liveness probe of {} failed: {}", url, e);
                false
            }
        }
    }
}
