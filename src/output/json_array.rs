//! Single JSON array sink
//!
//! Records are buffered in memory and written as one pretty-printed array
//! when the crawl finalizes the sink.

use crate::output::traits::{OutputError, OutputResult, PageRecord, RecordSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffers records and writes them as one JSON array
pub struct JsonArraySink {
    path: PathBuf,
    file: Option<File>,
    records: Vec<PageRecord>,
}

impl JsonArraySink {
    /// Creates or truncates `path` up front so an unwritable target fails
    /// before any page is fetched
    pub fn open(path: &Path) -> OutputResult<Self> {
        super::ensure_parent_dir(path)?;

        let file = File::create(path)?;
        tracing::debug!("Opened JSON array output at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            records: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonArraySink {
    fn append(&mut self, record: &PageRecord) -> OutputResult<()> {
        if self.file.is_none() {
            return Err(OutputError::Finalized);
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn record_count(&self) -> u64 {
        self.records.len() as u64
    }

    fn finalize(&mut self) -> OutputResult<()> {
        let file = self.file.take().ok_or(OutputError::Finalized)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!(
            "Wrote {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}
