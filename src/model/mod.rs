//! Crawl data model
//!
//! Every type here is built once and never mutated afterwards: the crawl
//! only appends records and aggregates them at the end of a run.

mod outcome;
mod record;

pub use outcome::{CategoryTally, CrawlOutcome};
pub use record::{CategoryLink, ItemRecord, PageResult};

/// The catalog site a run is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub base_url: String,
}

impl CrawlTarget {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}
