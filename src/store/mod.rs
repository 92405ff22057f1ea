//! Record Store Module
//!
//! Flat files of fixed-size, opaque records.
//!
//! ## Responsibilities
//! - Sequential append of records (sort output)
//! - Streaming read one record at a time (list build)
//! - Random access by record index (binary search)
//!
//! ## File Format
//! ```text
//! ┌──────────────┬──────────────┬─────┬──────────────┐
//! │ Record 0 (N) │ Record 1 (N) │ ... │ Record k (N) │
//! └──────────────┴──────────────┴─────┴──────────────┘
//! ```
//! No header, no footer. `N` is supplied by the caller and record `i`
//! starts at byte `i * N`.

mod iterator;
mod reader;
mod writer;

pub use iterator::RecordIterator;
pub use reader::RecordReader;
pub use writer::RecordWriter;

use std::path::Path;

use crate::error::{Result, SortError};

/// Number of whole records in the store at `path`
pub fn record_count(path: &Path, record_size: usize) -> Result<u64> {
    if record_size == 0 {
        return Err(SortError::Config("record_size must be greater than zero".into()));
    }
    let len = std::fs::metadata(path)?.len();
    Ok(len / record_size as u64)
}
