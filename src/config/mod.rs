//! Configuration module for Review-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use review_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawl will stop after {} records", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuthCookie, Config, CrawlSettings, OutputConfig, OutputFormat};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
