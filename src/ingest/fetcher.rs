// src/ingest/fetcher.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::FeedSource;
use crate::ingest::types::{FeedError, FeedFetcher};

/// Live fetcher: one GET per feed, no retries. The timeout is applied to
/// the whole request (connect + body).
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<String, FeedError> {
        let resp = self
            .client
            .get(&source.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FeedError::Fetch {
                url: source.url.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: source.url.clone(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FeedError::Body {
            url: source.url.clone(),
            source: e,
        })
    }
}

enum Fixture {
    Body { xml: String, delay: Duration },
    Status(u16),
}

/// In-memory fetcher keyed by URL. Unknown URLs fail with `FeedError::Missing`.
#[derive(Default)]
pub struct FixtureFetcher {
    payloads: HashMap<String, Fixture>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, xml: &str) -> Self {
        self.with_delayed_body(url, xml, Duration::ZERO)
    }

    /// Same as `with_body`, but the payload is only handed out after `delay`.
    pub fn with_delayed_body(mut self, url: &str, xml: &str, delay: Duration) -> Self {
        self.payloads.insert(
            url.to_string(),
            Fixture::Body {
                xml: xml.to_string(),
                delay,
            },
        );
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.payloads.insert(url.to_string(), Fixture::Status(status));
        self
    }
}

#[async_trait]
impl FeedFetcher for FixtureFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<String, FeedError> {
        match self.payloads.get(&source.url) {
            Some(Fixture::Body { xml, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(xml.clone())
            }
            Some(Fixture::Status(status)) => Err(FeedError::Status {
                url: source.url.clone(),
                status: *status,
            }),
            None => Err(FeedError::Missing(source.url.clone())),
        }
    }
}
