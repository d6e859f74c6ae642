//! Shelf-Trawl: a polite catalog crawler
//!
//! This crate walks the category listings of a paginated catalog site,
//! extracts one record per item, persists the raw records and runs a
//! cleaning stage that turns them into a tabular file.

pub mod config;
pub mod crawler;
pub mod etl;
pub mod model;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Access denied for {user_agent} to {url}: {reason}")]
    PermissionDenied {
        url: String,
        user_agent: String,
        reason: String,
    },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to fetch {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },

    #[error("Unexpected page structure at {url}: {message}")]
    ParseShape { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cleaning stage error: {0}")]
    Etl(#[from] etl::EtlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Category task failed: {0}")]
    Task(String),
}

impl TrawlError {
    /// Returns true if this error stopped the run before any page was fetched
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("URL does not name an .html page: {0}")]
    NotAPage(String),
}

/// Result type alias for Shelf-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, Fetcher, RunReport};
pub use model::{CategoryLink, CrawlOutcome, CrawlTarget, ItemRecord, PageResult};
pub use storage::{JsonFileStore, RecordStore, SqliteStore};
