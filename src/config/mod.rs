//! Configuration module for Shelf-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Only `target.base-url` is required; every other section falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use shelf_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling: {}", config.target.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, RobotsConfig, SinkKind, TargetConfig,
    DEFAULT_USER_AGENTS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
