//! Review-Harvest: a breadth-first review scraper
//!
//! This crate walks a content site from a start URL, follows links whose raw
//! `href` matches a glob, extracts the text of a designated HTML fragment from
//! every review page and streams one record per page to durable output.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Review-Harvest operations
///
/// Only configuration and resource-acquisition failures surface through this
/// type. Per-page fetch failures are contained inside the crawl loop.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
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

    #[error("Invalid content selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Review-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlResult, PageRecord};
pub use state::{CrawlState, StopReason};
pub use url::{matches_glob, normalize_url, Scope};
