//! Record Store Reader
//!
//! Random access by record index plus sequential streaming.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SortError};

use super::iterator::RecordIterator;

/// Reader over an existing Record Store
pub struct RecordReader {
    /// Path to the store (for messages)
    path: PathBuf,
    /// File handle shared by random and sequential reads
    pub(super) file: BufReader<File>,
    /// Size of every record
    record_size: usize,
    /// Whole records in the file
    record_count: u64,
    /// Bytes after the last whole record
    trailing_bytes: u64,
}

impl RecordReader {
    /// Open a store whose records are `record_size` bytes each
    pub fn open(path: &Path, record_size: usize) -> Result<Self> {
        if record_size == 0 {
            return Err(SortError::Config("record_size must be greater than zero".into()));
        }

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let record_count = len / record_size as u64;
        let trailing_bytes = len % record_size as u64;

        if trailing_bytes != 0 {
            warn!(
                path = %path.display(),
                trailing_bytes,
                record_size,
                "record store does not end on a record boundary"
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(file),
            record_size,
            record_count,
            trailing_bytes,
        })
    }

    /// Size of every record
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of whole records
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Bytes of an incomplete final record, if any
    pub fn trailing_bytes(&self) -> u64 {
        self.trailing_bytes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record at `index` into `buf`
    pub fn read_at(&mut self, index: u64, buf: &mut [u8]) -> Result<()> {
        self.check_buffer(buf)?;
        if index >= self.record_count {
            return Err(SortError::Structural(format!(
                "record index {} out of range for {} records in {}",
                index,
                self.record_count,
                self.path.display()
            )));
        }

        self.file.seek(SeekFrom::Start(index * self.record_size as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Read the next record from the current position
    ///
    /// Returns `Ok(false)` at a clean end of file. A partial record at the
    /// end is a structural error.
    pub fn read_next(&mut self, buf: &mut [u8]) -> Result<bool> {
        self.check_buffer(buf)?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SortError::Io(e)),
            }
        }

        if filled == 0 {
            return Ok(false);
        }
        if filled < buf.len() {
            return Err(SortError::Structural(format!(
                "partial trailing record of {} bytes in {} (record size {})",
                filled,
                self.path.display(),
                self.record_size
            )));
        }
        Ok(true)
    }

    /// Move the sequential position back to the first record
    pub fn rewind(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Iterate over all records from the start
    pub fn iter(&mut self) -> Result<RecordIterator<'_>> {
        self.rewind()?;
        Ok(RecordIterator::new(self))
    }

    fn check_buffer(&self, buf: &[u8]) -> Result<()> {
        if buf.len() != self.record_size {
            return Err(SortError::Structural(format!(
                "buffer of {} bytes for {} byte records",
                buf.len(),
                self.record_size
            )));
        }
        Ok(())
    }
}
