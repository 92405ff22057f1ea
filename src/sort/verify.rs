//! Sorted-order check for a Record Store

use std::cmp::Ordering;

use crate::compare::RecordComparator;
use crate::error::{record_buffer, Result};
use crate::store::RecordReader;

/// Index of the first record smaller than its predecessor, or `None` if the
/// store is non-decreasing under `compare`
pub fn verify_sorted<C>(reader: &mut RecordReader, compare: &C) -> Result<Option<u64>>
where
    C: RecordComparator + ?Sized,
{
    let mut prev = record_buffer(reader.record_size())?;
    let mut current = record_buffer(reader.record_size())?;

    reader.rewind()?;
    if reader.is_empty() || !reader.read_next(&mut prev)? {
        return Ok(None);
    }

    let mut index = 1;
    while index < reader.record_count() && reader.read_next(&mut current)? {
        if compare(prev.as_slice(), current.as_slice()) == Ordering::Greater {
            return Ok(Some(index));
        }
        std::mem::swap(&mut prev, &mut current);
        index += 1;
    }
    Ok(None)
}
