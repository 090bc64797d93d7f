//! Catalog-Harvest: a paginated catalog scraper
//!
//! This crate walks a paginated product catalog page by page, extracts a
//! summary record for every listed item, enriches each one from its detail
//! page, and writes the resulting records to a CSV, spreadsheet, SQLite or
//! MySQL destination.

pub mod config;
pub mod crawler;
pub mod model;
pub mod report;
pub mod sink;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
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

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{start_crawl, CrawlHandle, CrawlMode, CrawlRequest, CrawlResult, CrawlStatus};
pub use model::{Rating, Record};
pub use sink::{SinkFormat, SinkTarget, Sinks};
