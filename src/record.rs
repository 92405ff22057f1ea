//! Sales Record Layout
//!
//! The fixed-size sales row the report layer sorts and searches most often.
//! Encoded with bincode's fixed-width little-endian layout, so every field
//! sits at a constant offset and comparators can read it in place.
//!
//! ```text
//! ┌───────────┬──────┬───────────┬───────────┬─────────┬───────┬─────────┬─────┬──────────┐
//! │ OrderNo 8 │ Line │ OrderDate │ Delivered │ Cust 4  │ Store │ Product │ Qty │ Currency │
//! │   u64     │  u8  │    4      │    4      │  u32    │  u16  │   u16   │ u16 │    4     │
//! └───────────┴──────┴───────────┴───────────┴─────────┴───────┴─────────┴─────┴──────────┘
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SortError};

/// Encoded size of a [`SaleRecord`]
pub const SALE_RECORD_SIZE: usize = 31;

/// Offset of `order_date` inside an encoded sale
pub const ORDER_DATE_OFFSET: usize = 9;

/// Offset of `delivery_date` inside an encoded sale
pub const DELIVERY_DATE_OFFSET: usize = 13;

/// Offset of `product_key` inside an encoded sale
pub const PRODUCT_KEY_OFFSET: usize = 23;

/// Calendar date stored as day, month, year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl Date {
    pub fn new(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }

    /// Read a date stored at `offset` of an encoded record
    pub fn read_at(record: &[u8], offset: usize) -> Self {
        let byte = |i: usize| record.get(offset + i).copied().unwrap_or(0);
        Self {
            day: byte(0),
            month: byte(1),
            year: u16::from_le_bytes([byte(2), byte(3)]),
        }
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then(self.month.cmp(&other.month))
            .then(self.day.cmp(&other.day))
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

impl FromStr for Date {
    type Err = SortError;

    /// Parse `DD/MM/YYYY`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(SortError::Config(format!("expected DD/MM/YYYY, got {:?}", s)));
        }

        let bad = |_| SortError::Config(format!("invalid date {:?}", s));
        let day: u8 = parts[0].parse().map_err(bad)?;
        let month: u8 = parts[1].parse().map_err(bad)?;
        let year: u16 = parts[2].parse().map_err(bad)?;

        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(month, year) {
            return Err(SortError::Config(format!("date out of range: {:?}", s)));
        }
        Ok(Self { day, month, year })
    }
}

fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// One sales transaction line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub order_number: u64,
    pub line_item: u8,
    pub order_date: Date,
    pub delivery_date: Date,
    pub customer_key: u32,
    pub store_key: u16,
    pub product_key: u16,
    pub quantity: u16,
    /// Three-letter code plus a NUL terminator
    pub currency_code: [u8; 4],
}

impl SaleRecord {
    /// Three-letter currency code as text
    pub fn currency(&self) -> &str {
        let end = self.currency_code.iter().position(|&b| b == 0).unwrap_or(4);
        std::str::from_utf8(&self.currency_code[..end]).unwrap_or("")
    }

    pub fn set_currency(&mut self, code: &str) {
        self.currency_code = [0u8; 4];
        for (slot, byte) in self.currency_code.iter_mut().zip(code.bytes().take(3)) {
            *slot = byte;
        }
    }

    /// Encode into exactly [`SALE_RECORD_SIZE`] bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        let bytes = bincode::serialize(self)
            .map_err(|e| SortError::Serialization(format!("encode sale: {}", e)))?;
        if bytes.len() != SALE_RECORD_SIZE {
            return Err(SortError::Serialization(format!(
                "sale encoded to {} bytes, expected {}",
                bytes.len(),
                SALE_RECORD_SIZE
            )));
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SALE_RECORD_SIZE {
            return Err(SortError::Serialization(format!(
                "sale record must be {} bytes, got {}",
                SALE_RECORD_SIZE,
                bytes.len()
            )));
        }
        bincode::deserialize(bytes).map_err(|e| SortError::Serialization(format!("decode sale: {}", e)))
    }
}
