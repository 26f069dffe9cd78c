//! Newline-delimited JSON sink
//!
//! Every record is written and flushed before `append` returns, so an
//! interrupted crawl keeps everything it extracted so far.

use crate::output::traits::{OutputError, OutputResult, PageRecord, RecordSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one JSON object per line to a file
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    count: u64,
    finalized: bool,
}

impl JsonLinesSink {
    /// Opens `path` in append mode, creating parent directories as needed
    pub fn open(path: &Path) -> OutputResult<Self> {
        super::ensure_parent_dir(path)?;

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!("Opened JSON lines output at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            count: 0,
            finalized: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn append(&mut self, record: &PageRecord) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::Finalized);
        }

        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.count += 1;
        Ok(())
    }

    fn record_count(&self) -> u64 {
        self.count
    }

    fn finalize(&mut self) -> OutputResult<()> {
        if self.finalized {
            return Err(OutputError::Finalized);
        }
        self.finalized = true;
        self.writer.flush()?;
        Ok(())
    }
}
