//! Comparator Library
//!
//! Three-way orderings over two opaque records. A comparator must be total
//! and consistent: binary search relies on it matching the sort order.
//!
//! Readers of fixed-offset fields never panic on short records; missing
//! bytes read as zero.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{Result, SortError};
use crate::record::{Date, ORDER_DATE_OFFSET, PRODUCT_KEY_OFFSET};

/// Any function ordering two records
pub trait RecordComparator: Fn(&[u8], &[u8]) -> Ordering {}

impl<F> RecordComparator for F where F: Fn(&[u8], &[u8]) -> Ordering + ?Sized {}

// =============================================================================
// Field Readers
// =============================================================================

fn field<const N: usize>(record: &[u8], offset: usize) -> [u8; N] {
    let mut bytes = [0u8; N];
    if let Some(available) = record.get(offset..) {
        let n = available.len().min(N);
        bytes[..n].copy_from_slice(&available[..n]);
    }
    bytes
}

/// Bytes of `record[offset..offset + len]` up to the first NUL
fn c_str(record: &[u8], offset: usize, len: usize) -> &[u8] {
    let start = offset.min(record.len());
    let end = offset.saturating_add(len).min(record.len());
    let bytes = &record[start..end];
    match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    }
}

// =============================================================================
// Whole-Record Comparators
// =============================================================================

/// Lexicographic byte order
pub fn compare_bytes(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Little-endian u32 at offset 0
pub fn compare_u32_le(a: &[u8], b: &[u8]) -> Ordering {
    u32::from_le_bytes(field(a, 0)).cmp(&u32::from_le_bytes(field(b, 0)))
}

/// Little-endian i32 at offset 0
pub fn compare_i32_le(a: &[u8], b: &[u8]) -> Ordering {
    i32::from_le_bytes(field(a, 0)).cmp(&i32::from_le_bytes(field(b, 0)))
}

/// Little-endian u64 at offset 0
pub fn compare_u64_le(a: &[u8], b: &[u8]) -> Ordering {
    u64::from_le_bytes(field(a, 0)).cmp(&u64::from_le_bytes(field(b, 0)))
}

/// Little-endian i64 at offset 0
pub fn compare_i64_le(a: &[u8], b: &[u8]) -> Ordering {
    i64::from_le_bytes(field(a, 0)).cmp(&i64::from_le_bytes(field(b, 0)))
}

/// Little-endian f64 at offset 0, IEEE total order
pub fn compare_f64_le(a: &[u8], b: &[u8]) -> Ordering {
    f64::from_le_bytes(field(a, 0)).total_cmp(&f64::from_le_bytes(field(b, 0)))
}

// =============================================================================
// Combinators
// =============================================================================

/// Invert an ordering
pub fn reversed<C: RecordComparator>(compare: C) -> impl Fn(&[u8], &[u8]) -> Ordering {
    move |a: &[u8], b: &[u8]| compare(b, a)
}

/// Order by `first`, breaking ties with `second`
pub fn then<C1, C2>(first: C1, second: C2) -> impl Fn(&[u8], &[u8]) -> Ordering
where
    C1: RecordComparator,
    C2: RecordComparator,
{
    move |a: &[u8], b: &[u8]| first(a, b).then_with(|| second(a, b))
}

// =============================================================================
// Sales Comparators
// =============================================================================

/// Chronological order
pub fn compare_dates(a: &Date, b: &Date) -> Ordering {
    a.cmp(b)
}

/// Encoded sales by order date
pub fn compare_sales_by_order_date(a: &[u8], b: &[u8]) -> Ordering {
    compare_dates(
        &Date::read_at(a, ORDER_DATE_OFFSET),
        &Date::read_at(b, ORDER_DATE_OFFSET),
    )
}

/// Encoded sales by product key
pub fn compare_sales_by_product_key(a: &[u8], b: &[u8]) -> Ordering {
    let key = |r: &[u8]| u16::from_le_bytes(field(r, PRODUCT_KEY_OFFSET));
    key(a).cmp(&key(b))
}

/// Encoded sales by order date, then product key
pub fn compare_sales_by_date_then_product(a: &[u8], b: &[u8]) -> Ordering {
    compare_sales_by_order_date(a, b).then_with(|| compare_sales_by_product_key(a, b))
}

// =============================================================================
// Run-time Key Description
// =============================================================================

/// Type of a key field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    U32,
    I32,
    U64,
    I64,
    F64,
    /// NUL-terminated or NUL-padded text, compared like `strcmp`
    Bytes,
}

impl KeyKind {
    /// Fixed width of numeric kinds
    pub fn width(&self) -> Option<usize> {
        match self {
            KeyKind::U32 | KeyKind::I32 => Some(4),
            KeyKind::U64 | KeyKind::I64 | KeyKind::F64 => Some(8),
            KeyKind::Bytes => None,
        }
    }
}

impl FromStr for KeyKind {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u32" => Ok(KeyKind::U32),
            "i32" => Ok(KeyKind::I32),
            "u64" => Ok(KeyKind::U64),
            "i64" => Ok(KeyKind::I64),
            "f64" => Ok(KeyKind::F64),
            "bytes" | "str" => Ok(KeyKind::Bytes),
            other => Err(SortError::Config(format!("Unknown key type: {}", other))),
        }
    }
}

/// A key field at a fixed offset of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub kind: KeyKind,
    pub offset: usize,
    /// Field length for `Bytes`; ignored for numeric kinds
    pub len: usize,
    pub descending: bool,
}

impl KeySpec {
    /// A numeric key at `offset`
    pub fn numeric(kind: KeyKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            len: kind.width().unwrap_or(0),
            descending: false,
        }
    }

    /// A text key of `len` bytes at `offset`
    pub fn bytes(offset: usize, len: usize) -> Self {
        Self {
            kind: KeyKind::Bytes,
            offset,
            len,
            descending: false,
        }
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Bytes the key occupies in a record
    pub fn width(&self) -> usize {
        self.kind.width().unwrap_or(self.len)
    }

    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let o = self.offset;
        let ordering = match self.kind {
            KeyKind::U32 => u32::from_le_bytes(field(a, o)).cmp(&u32::from_le_bytes(field(b, o))),
            KeyKind::I32 => i32::from_le_bytes(field(a, o)).cmp(&i32::from_le_bytes(field(b, o))),
            KeyKind::U64 => u64::from_le_bytes(field(a, o)).cmp(&u64::from_le_bytes(field(b, o))),
            KeyKind::I64 => i64::from_le_bytes(field(a, o)).cmp(&i64::from_le_bytes(field(b, o))),
            KeyKind::F64 => {
                f64::from_le_bytes(field(a, o)).total_cmp(&f64::from_le_bytes(field(b, o)))
            }
            KeyKind::Bytes => c_str(a, o, self.len).cmp(c_str(b, o, self.len)),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// The ordering as a plain comparator
    pub fn comparator(self) -> impl Fn(&[u8], &[u8]) -> Ordering {
        move |a: &[u8], b: &[u8]| self.compare(a, b)
    }

    /// Build a zeroed probe record with `value` in the key field
    pub fn encode_key(&self, value: &str, record_size: usize) -> Result<Vec<u8>> {
        let end = self
            .offset
            .checked_add(self.width())
            .filter(|&end| self.width() > 0 && end <= record_size)
            .ok_or_else(|| {
                SortError::Config(format!(
                    "key field of {} bytes at offset {} does not fit a {} byte record",
                    self.width(),
                    self.offset,
                    record_size
                ))
            })?;

        let bad = |e: &dyn std::fmt::Display| {
            SortError::Config(format!("cannot parse {:?} as {:?}: {}", value, self.kind, e))
        };

        let mut record = vec![0u8; record_size];
        let slot = &mut record[self.offset..end];
        match self.kind {
            KeyKind::U32 => slot.copy_from_slice(&value.parse::<u32>().map_err(|e| bad(&e))?.to_le_bytes()),
            KeyKind::I32 => slot.copy_from_slice(&value.parse::<i32>().map_err(|e| bad(&e))?.to_le_bytes()),
            KeyKind::U64 => slot.copy_from_slice(&value.parse::<u64>().map_err(|e| bad(&e))?.to_le_bytes()),
            KeyKind::I64 => slot.copy_from_slice(&value.parse::<i64>().map_err(|e| bad(&e))?.to_le_bytes()),
            KeyKind::F64 => slot.copy_from_slice(&value.parse::<f64>().map_err(|e| bad(&e))?.to_le_bytes()),
            KeyKind::Bytes => {
                let n = value.len().min(slot.len());
                slot[..n].copy_from_slice(&value.as_bytes()[..n]);
            }
        }
        Ok(record)
    }
}
