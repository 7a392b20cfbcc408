// src/config/mod.rs
//! Startup configuration: feed sources, keyword sets and polling knobs.
//!
//! Built once in `main` and shared read-only (`Arc`) with the pipeline.
//! Feed and keyword lists are compiled in (see [`defaults`]) and no file is
//! consulted; only the polling knobs and bind address come from the
//! environment. Tests inject their own lists by building a [`MeterConfig`]
//! directly.

pub mod defaults;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use crate::aggregate::FetchStrategy;
use defaults::*;

pub const ENV_INTERVAL_SECS: &str = "METER_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "METER_FETCH_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "METER_CONCURRENCY";
pub const ENV_BIND: &str = "METER_BIND";

/// One syndication endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSource {
    pub url: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Primary (full weight) and secondary (half weight) keyword lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl KeywordSets {
    pub fn new<P, S>(primary: P, secondary: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            primary: clean_list(primary.into_iter().map(Into::into)),
            secondary: clean_list(secondary.into_iter().map(Into::into)),
        }
    }
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRIMARY_KEYWORDS.iter().copied(),
            DEFAULT_SECONDARY_KEYWORDS.iter().copied(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct MeterConfig {
    pub feeds: Vec<FeedSource>,
    pub keywords: KeywordSets,
    pub interval: Duration,
    pub fetch_timeout: Duration,
    pub strategy: FetchStrategy,
    pub bind_addr: SocketAddr,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            keywords: KeywordSets::default(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            strategy: FetchStrategy::from_concurrency(DEFAULT_CONCURRENCY),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

impl MeterConfig {
    /// Compiled-in lists + env knobs.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(secs) = env_parse::<u64>(ENV_INTERVAL_SECS).filter(|s| *s > 0) {
            cfg.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>(ENV_FETCH_TIMEOUT_SECS).filter(|s| *s > 0) {
            cfg.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = env_parse::<usize>(ENV_CONCURRENCY) {
            cfg.strategy = FetchStrategy::from_concurrency(n);
        }
        let bind = std::env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        cfg.bind_addr = bind
            .trim()
            .parse()
            .with_context(|| format!("parsing {ENV_BIND}={bind}"))?;

        Ok(cfg)
    }
}

fn default_feeds() -> Vec<FeedSource> {
    DEFAULT_FEED_URLS.iter().copied().map(FeedSource::new).collect()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Trim entries and drop empty ones. Order and duplicates are kept: a
/// keyword listed twice is scored twice.
pub fn clean_list<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|it| {
            let t = it.trim();
            (!t.is_empty()).then(|| t.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_keeps_order_and_duplicates() {
        let out = clean_list(vec![" bomba ".into(), "".into(), "war".into(), "bomba".into()]);
        assert_eq!(out, vec!["bomba", "war", "bomba"]);
    }

    #[test]
    fn defaults_mirror_compiled_lists() {
        let cfg = MeterConfig::default();
        assert_eq!(cfg.feeds.len(), DEFAULT_FEED_URLS.len());
        assert_eq!(cfg.interval, Duration::from_secs(10));
        assert_eq!(cfg.strategy, FetchStrategy::Sequential);
    }
}
