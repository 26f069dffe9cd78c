//! Output module for persisting extracted records
//!
//! This module handles:
//! - Streaming records as newline-delimited JSON
//! - Writing a single JSON array at the end of a crawl
//! - Reporting crawl results

mod json_array;
mod jsonl;
pub mod stats;
mod traits;

pub use json_array::JsonArraySink;
pub use jsonl::JsonLinesSink;
pub use stats::{format_result, print_result};
pub use traits::{OutputError, OutputResult, PageRecord, RecordSink};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Opens the sink selected by the output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn RecordSink>)` - Sink ready to accept records
/// * `Err(OutputError)` - The target could not be opened for writing
pub fn open_sink(config: &OutputConfig) -> OutputResult<Box<dyn RecordSink>> {
    let path = Path::new(&config.path);
    match config.format {
        OutputFormat::JsonLines => Ok(Box::new(JsonLinesSink::open(path)?)),
        OutputFormat::JsonArray => Ok(Box::new(JsonArraySink::open(path)?)),
    }
}

/// Creates the parent directory of an output path if it is missing
fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
