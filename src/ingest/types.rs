// src/ingest/types.rs
use crate::config::FeedSource;

/// Used when an item carries no (or an empty) `<link>`.
pub const UNKNOWN_LINK: &str = "unknown link";

/// One syndication item as found in a feed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub description: String,
    pub link: String,
}

impl Entry {
    /// `lowercase(title) + " " + lowercase(description)`; the text keywords are matched against.
    pub fn content(&self) -> String {
        format!(
            "{} {}",
            self.title.to_lowercase(),
            self.description.to_lowercase()
        )
    }
}

/// Per-feed failures. All of them stop at the aggregator's per-feed boundary.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("reading body of {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("feed payload is not well-formed XML: {0}")]
    Parse(String),
    #[error("no payload registered for {0}")]
    Missing(String),
}

impl FeedError {
    /// Short label used as the `kind` metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Fetch { .. } => "fetch",
            FeedError::Status { .. } => "status",
            FeedError::Body { .. } => "body",
            FeedError::Parse(_) => "parse",
            FeedError::Missing(_) => "missing",
        }
    }
}

/// Retrieves the raw payload of one feed.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<String, FeedError>;
}
