//! Record Store Writer
//!
//! Appends fixed-size records to a new store file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SortError};

/// Sequential writer for a new Record Store
pub struct RecordWriter {
    /// Output file path
    path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Size every appended record must have
    record_size: usize,
    /// Number of records written
    records_written: u64,
}

impl RecordWriter {
    /// Create (or truncate) a store file for writing
    pub fn create(path: &Path, record_size: usize) -> Result<Self> {
        if record_size == 0 {
            return Err(SortError::Config("record_size must be greater than zero".into()));
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            record_size,
            records_written: 0,
        })
    }

    /// Append one record
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        if record.len() != self.record_size {
            return Err(SortError::Structural(format!(
                "record of {} bytes written to a store of {} byte records",
                record.len(),
                self.record_size
            )));
        }
        self.writer.write_all(record)?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records appended so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Path of the store being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush everything and return the record count
    pub fn finish(self, sync: bool) -> Result<u64> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| SortError::Io(e.into_error()))?;
        if sync {
            file.sync_all()?;
        }
        Ok(self.records_written)
    }
}
