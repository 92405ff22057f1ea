//! Binary Search
//!
//! Point and range lookups over a sorted Record Store. Records are read one
//! at a time by index; nothing beyond a single record buffer is held.
//!
//! The comparator is always called as `compare(key, record)` and must be the
//! ordering the store was sorted with.

use std::cmp::Ordering;

use crate::compare::RecordComparator;
use crate::error::{record_buffer, Result};
use crate::store::RecordReader;

/// Inclusive span of records equal to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: u64,
    pub end: u64,
}

impl MatchRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a range holds at least one match
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: u64) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Index of some record equal to `key`
///
/// With duplicate keys any one of the equal records may be returned. An
/// empty store is `Ok(None)` without touching the file.
pub fn search_point<C>(reader: &mut RecordReader, key: &[u8], compare: &C) -> Result<Option<u64>>
where
    C: RecordComparator + ?Sized,
{
    if reader.is_empty() {
        return Ok(None);
    }

    let mut record = record_buffer(reader.record_size())?;
    let mut low = 0u64;
    let mut high = reader.record_count();

    while low < high {
        let mid = low + (high - low) / 2;
        reader.read_at(mid, &mut record)?;

        match compare(key, record.as_slice()) {
            Ordering::Equal => return Ok(Some(mid)),
            Ordering::Less => high = mid,
            Ordering::Greater => low = mid + 1,
        }
    }

    Ok(None)
}

/// The full run of records equal to `key`
///
/// Finds one match, then widens one record at a time in each direction.
pub fn search_range<C>(reader: &mut RecordReader, key: &[u8], compare: &C) -> Result<Option<MatchRange>>
where
    C: RecordComparator + ?Sized,
{
    let found = match search_point(reader, key, compare)? {
        Some(index) => index,
        None => return Ok(None),
    };

    let mut record = record_buffer(reader.record_size())?;

    let mut start = found;
    while start > 0 {
        reader.read_at(start - 1, &mut record)?;
        if compare(key, record.as_slice()) != Ordering::Equal {
            break;
        }
        start -= 1;
    }

    let last = reader.record_count() - 1;
    let mut end = found;
    while end < last {
        reader.read_at(end + 1, &mut record)?;
        if compare(key, record.as_slice()) != Ordering::Equal {
            break;
        }
        end += 1;
    }

    Ok(Some(MatchRange { start, end }))
}
