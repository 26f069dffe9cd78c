//! Output sink traits and types
//!
//! This module defines the record written for every content page and the
//! trait interface every persistence mode implements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink already finalized")]
    Finalized,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One extracted review page
///
/// The text lives under the `html` key for compatibility with existing
/// datasets, even though it holds extracted text rather than markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL the page was requested under
    pub url: String,

    /// Text content of the first node matching the content selector
    #[serde(rename = "html")]
    pub extracted_text: String,
}

/// Trait for record sinks
///
/// The crawl controller calls `append` once per content page and
/// `finalize` exactly once when the crawl ends, whether it completed or
/// aborted.
pub trait RecordSink: Send {
    /// Persists or buffers one record
    fn append(&mut self, record: &PageRecord) -> OutputResult<()>;

    /// Number of records accepted so far in this run
    fn record_count(&self) -> u64;

    /// Flushes any buffered state to the destination
    fn finalize(&mut self) -> OutputResult<()>;
}
