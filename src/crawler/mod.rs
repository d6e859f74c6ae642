//! Crawler module for catalog fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry, backoff and identity rotation
//! - HTML parsing of index and listing pages
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, walk_category, Coordinator, RunReport, RunTimer};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, RetryPolicy, UserAgentPool};
pub use parser::{
    extract_category_links, extract_item_records, extract_next_page_url, parse_listing_page,
};
