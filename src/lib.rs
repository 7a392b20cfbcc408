// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod present;
pub mod scan;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{calculate_index, Aggregator, CycleResult, FetchStrategy};
pub use crate::api::router;
pub use crate::config::{FeedSource, KeywordSets, MeterConfig};
pub use crate::ingest::types::{Entry, FeedError, FeedFetcher, UNKNOWN_LINK};
pub use crate::present::{MeterPresenter, MeterReading};
pub use crate::scan::{KeywordMatch, KeywordScanner, WeightClass};
pub use crate::scheduler::{spawn_scheduler, CycleRunner};
