//! Scraping error taxonomy.
//!
//! Lower layers return these; only the orchestration layer in `service` is
//! allowed to absorb one and substitute mock data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No response at all: DNS, connect, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("source returned HTTP {0}")]
    Status(u16),

    /// Markup was fetched but could not be interpreted.
    #[error("failed to parse page: {0}")]
    Parse(String),

    /// Every selector strategy came up empty where data was expected.
    #[error("no data extracted from {0}")]
    EmptyExtraction(String),

    /// An id absent from both live and mock datasets.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

impl ScrapeError {
    /// Transient errors are worth another attempt: no response at all, or a
    /// 5xx from the host. Client errors (4xx) are not retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Network(_) => true,
            ScrapeError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}
