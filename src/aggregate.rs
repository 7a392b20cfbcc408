// src/aggregate.rs
//! # Aggregator
//! Drives fetch → parse → scan over every configured feed and folds the
//! results into one [`CycleResult`].
//!
//! Fetching may run sequentially or with bounded parallelism; either way the
//! payloads are handed to the scanner in source order, so evidence order is
//! feed order → entry order → primary before secondary → keyword list order.
//! A failing feed is logged and contributes nothing; it never aborts the cycle.

use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{FeedSource, MeterConfig};
use crate::ingest::fetcher::HttpFetcher;
use crate::ingest::parser::parse_entries;
use crate::ingest::types::{Entry, FeedError, FeedFetcher};
use crate::scan::{KeywordMatch, KeywordScanner, WeightClass};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("meter_cycles_total", "Completed polling cycles.");
        describe_counter!("meter_entries_total", "Feed entries scanned.");
        describe_counter!(
            "meter_feed_errors_total",
            "Feeds that failed to fetch or parse, by kind."
        );
        describe_gauge!("meter_index", "Latest war index in [0,100].");
        describe_histogram!("meter_cycle_ms", "Cycle duration in milliseconds.");
    });
}

/// How feed payloads are retrieved within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One feed at a time, in configuration order.
    Sequential,
    /// Up to `n` fetches in flight; results are still merged in source order.
    Bounded(usize),
}

impl FetchStrategy {
    /// `0` and `1` mean sequential.
    pub fn from_concurrency(n: usize) -> Self {
        if n <= 1 {
            FetchStrategy::Sequential
        } else {
            FetchStrategy::Bounded(n)
        }
    }
}

/// Outcome of one polling cycle. Never merged across cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleResult {
    pub raw_score: f64,
    pub total_entries: u64,
    pub evidence: Vec<KeywordMatch>,
    pub primary_total: u64,
    pub secondary_total: u64,
    pub feeds_ok: usize,
    pub feeds_failed: usize,
}

impl CycleResult {
    pub fn index(&self) -> f64 {
        calculate_index(self.raw_score, self.total_entries)
    }

    /// Evidence rendered as `"{keyword} ({link})"`.
    pub fn evidence_lines(&self) -> Vec<String> {
        self.evidence.iter().map(ToString::to_string).collect()
    }
}

/// `primary + 0.5 × secondary`.
pub fn raw_score(primary_total: u64, secondary_total: u64) -> f64 {
    primary_total as f64 * WeightClass::Primary.weight()
        + secondary_total as f64 * WeightClass::Secondary.weight()
}

/// Average weighted hits per entry as a percentage, clamped to [0,100].
/// Zero entries yields 0.
pub fn calculate_index(raw_score: f64, total_entries: u64) -> f64 {
    if total_entries == 0 {
        return 0.0;
    }
    let index = (raw_score / total_entries as f64) * 100.0;
    if index.is_nan() {
        return 0.0;
    }
    index.clamp(0.0, 100.0)
}

pub struct Aggregator {
    feeds: Vec<FeedSource>,
    scanner: KeywordScanner,
    fetcher: Arc<dyn FeedFetcher>,
    strategy: FetchStrategy,
}

impl Aggregator {
    pub fn new(
        feeds: Vec<FeedSource>,
        scanner: KeywordScanner,
        fetcher: Arc<dyn FeedFetcher>,
        strategy: FetchStrategy,
    ) -> Self {
        Self {
            feeds,
            scanner,
            fetcher,
            strategy,
        }
    }

    /// Live pipeline: HTTP fetcher with the configured timeout.
    pub fn from_config(cfg: &MeterConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(cfg.fetch_timeout));
        Self::new(
            cfg.feeds.clone(),
            KeywordScanner::new(Arc::new(cfg.keywords.clone())),
            fetcher,
            cfg.strategy,
        )
    }

    /// Run one full cycle. Infallible: per-feed errors are logged and dropped.
    pub async fn run_cycle(&self) -> CycleResult {
        ensure_metrics_described();
        let t0 = Instant::now();

        let payloads = self.load_all().await;

        let mut out = CycleResult::default();
        for (source, loaded) in self.feeds.iter().zip(payloads) {
            match loaded {
                Ok(entries) => {
                    out.feeds_ok += 1;
                    self.scan_feed(&entries, &mut out);
                }
                Err(e) => {
                    tracing::warn!(
                        feed = %source,
                        kind = e.kind(),
                        error = %e,
                        "feed skipped this cycle"
                    );
                    counter!("meter_feed_errors_total", "kind" => e.kind()).increment(1);
                    out.feeds_failed += 1;
                }
            }
        }
        out.raw_score = raw_score(out.primary_total, out.secondary_total);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("meter_cycle_ms").record(ms);
        counter!("meter_cycles_total").increment(1);
        counter!("meter_entries_total").increment(out.total_entries);
        gauge!("meter_index").set(out.index());

        tracing::info!(
            target: "meter",
            index = out.index(),
            raw_score = out.raw_score,
            total_entries = out.total_entries,
            evidence = out.evidence.len(),
            feeds_ok = out.feeds_ok,
            feeds_failed = out.feeds_failed,
            elapsed_ms = ms,
            "cycle complete"
        );
        out
    }

    /// Payloads in the same order as `self.feeds`, whatever the strategy.
    async fn load_all(&self) -> Vec<Result<Vec<Entry>, FeedError>> {
        match self.strategy {
            FetchStrategy::Sequential => {
                let mut v = Vec::with_capacity(self.feeds.len());
                for source in &self.feeds {
                    v.push(self.load_feed(source).await);
                }
                v
            }
            FetchStrategy::Bounded(n) => {
                // futures are lazy: nothing is fetched until `buffered` polls them,
                // and it yields in input order regardless of completion order
                let pending: Vec<_> = self.feeds.iter().map(|s| self.load_feed(s)).collect();
                stream::iter(pending)
                    .buffered(n.max(1))
                    .collect()
                    .await
            }
        }
    }

    async fn load_feed(&self, source: &FeedSource) -> Result<Vec<Entry>, FeedError> {
        let body = self.fetcher.fetch(source).await?;
        let entries = parse_entries(&body)?;
        tracing::debug!(feed = %source, entries = entries.len(), "feed parsed");
        Ok(entries)
    }

    fn scan_feed(&self, entries: &[Entry], out: &mut CycleResult) {
        for entry in entries {
            let scan = self.scanner.scan_entry(entry);
            out.primary_total += scan.primary_occurrences;
            out.secondary_total += scan.secondary_occurrences;
            out.evidence.extend(scan.matches);
            out.total_entries += 1;
        }
    }
}
