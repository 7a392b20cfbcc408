// src/ingest/mod.rs
//! Getting entries out of feeds: fetchers produce payload text, the parser
//! turns it into [`types::Entry`] values.

pub mod fetcher;
pub mod parser;
pub mod types;

pub use fetcher::{FixtureFetcher, HttpFetcher};
pub use parser::parse_entries;
