//! Disk Linked List Module
//!
//! A doubly linked list of fixed-size records that lives entirely in a file.
//! Sorting rewrites links or payload bytes in place; nodes never move.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Metadata (48 bytes)                                             │
//! │   Magic: "DLLF" (4) | Version: u16 (2) | Reserved: u16 (2)      │
//! │   Head: i64 (8) | Tail: i64 (8) | Count: u64 (8) | RecSize (8)  │
//! │   CRC32 of the 40 bytes above (4) | Padding (4)                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Node 0                                                          │
//! │   Prev: i64 (8) | Next: i64 (8) | DataSize: u64 (8) | Payload   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Node 1 ... Node n-1 (same layout, same size)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! A link of `-1` means "no node". While a list is being built the
//! metadata block is all zeros, so an interrupted build never looks valid.

mod builder;
mod file;
mod flatten;

use std::fmt;

pub use builder::{build_list, ListBuilder};
pub use file::DiskList;
pub use flatten::{flatten, FlattenOptions, FlattenStats};

use crate::error::{Result, SortError};

// =============================================================================
// Shared Constants (used by builder, file, flatten)
// =============================================================================

/// Magic bytes identifying a committed list file
pub(crate) const MAGIC: &[u8; 4] = b"DLLF";

/// Current list format version
pub(crate) const VERSION: u16 = 1;

/// Metadata block size, also the offset of the first node
pub const METADATA_SIZE: u64 = 48;

/// Node header size: Prev (8) + Next (8) + DataSize (8)
pub const NODE_HEADER_SIZE: u64 = 24;

/// On-disk encoding of a missing link
pub const NO_NODE: i64 = -1;

/// Bytes covered by the metadata checksum
const METADATA_CRC_SPAN: usize = 40;

// =============================================================================
// Node Offsets
// =============================================================================

/// Byte offset of a node inside a list file
///
/// The file acts as an arena and the offset as the key into it. A missing
/// link is `Option::None` in memory and [`NO_NODE`] on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeOffset(u64);

impl NodeOffset {
    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Offset of the first payload byte
    pub(crate) fn payload_offset(self) -> u64 {
        self.0 + NODE_HEADER_SIZE
    }
}

impl fmt::Display for NodeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn encode_link(link: Option<NodeOffset>) -> i64 {
    match link {
        Some(offset) => offset.0 as i64,
        None => NO_NODE,
    }
}

pub(crate) fn decode_link(raw: i64) -> Result<Option<NodeOffset>> {
    if raw == NO_NODE {
        Ok(None)
    } else if raw < 0 {
        Err(SortError::Structural(format!("negative link value {}", raw)))
    } else {
        Ok(Some(NodeOffset(raw as u64)))
    }
}

// =============================================================================
// Node Header
// =============================================================================

/// Links and payload size stored in front of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    pub prev: Option<NodeOffset>,
    pub next: Option<NodeOffset>,
    pub data_size: u64,
}

impl NodeHeader {
    /// An unlinked header for a payload of `data_size` bytes
    pub fn new(data_size: u64) -> Self {
        Self {
            prev: None,
            next: None,
            data_size,
        }
    }

    pub fn encode(&self) -> [u8; NODE_HEADER_SIZE as usize] {
        let mut bytes = [0u8; NODE_HEADER_SIZE as usize];
        bytes[0..8].copy_from_slice(&encode_link(self.prev).to_le_bytes());
        bytes[8..16].copy_from_slice(&encode_link(self.next).to_le_bytes());
        bytes[16..24].copy_from_slice(&self.data_size.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; NODE_HEADER_SIZE as usize]) -> Result<Self> {
        Ok(Self {
            prev: decode_link(read_i64(bytes, 0))?,
            next: decode_link(read_i64(bytes, 8))?,
            data_size: read_u64(bytes, 16),
        })
    }
}

/// A node offset with the header last read from (or written to) it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListNode {
    pub offset: NodeOffset,
    pub header: NodeHeader,
}

// =============================================================================
// List Metadata
// =============================================================================

/// List boundaries and sizes stored at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMetadata {
    pub head: Option<NodeOffset>,
    pub tail: Option<NodeOffset>,
    pub node_count: u64,
    pub record_size: u64,
}

impl ListMetadata {
    pub fn empty(record_size: u64) -> Self {
        Self {
            head: None,
            tail: None,
            node_count: 0,
            record_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Bytes one node occupies on disk
    pub fn node_size(&self) -> u64 {
        NODE_HEADER_SIZE + self.record_size
    }

    pub fn encode(&self) -> [u8; METADATA_SIZE as usize] {
        let mut bytes = [0u8; METADATA_SIZE as usize];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&VERSION.to_le_bytes());
        // bytes 6..8 reserved
        bytes[8..16].copy_from_slice(&encode_link(self.head).to_le_bytes());
        bytes[16..24].copy_from_slice(&encode_link(self.tail).to_le_bytes());
        bytes[24..32].copy_from_slice(&self.node_count.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.record_size.to_le_bytes());

        let crc = crc32fast::hash(&bytes[..METADATA_CRC_SPAN]);
        bytes[40..44].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; METADATA_SIZE as usize]) -> Result<Self> {
        if &bytes[0..4] != MAGIC {
            return Err(SortError::Format(format!(
                "bad magic: expected DLLF, got {:?} (incomplete build?)",
                &bytes[0..4]
            )));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(SortError::Format(format!("unsupported list version {}", version)));
        }

        let stored_crc = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
        let actual_crc = crc32fast::hash(&bytes[..METADATA_CRC_SPAN]);
        if stored_crc != actual_crc {
            return Err(SortError::Format(format!(
                "metadata checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, actual_crc
            )));
        }

        let metadata = Self {
            head: decode_link(read_i64(bytes, 8)).map_err(as_format)?,
            tail: decode_link(read_i64(bytes, 16)).map_err(as_format)?,
            node_count: read_u64(bytes, 24),
            record_size: read_u64(bytes, 32),
        };

        if metadata.record_size == 0 {
            return Err(SortError::Format("record size is zero".into()));
        }

        let bounds_empty = metadata.head.is_none() && metadata.tail.is_none();
        let bounds_partial = metadata.head.is_none() != metadata.tail.is_none();
        if bounds_partial || (metadata.node_count == 0) != bounds_empty {
            return Err(SortError::Format(format!(
                "inconsistent bounds: head={:?} tail={:?} count={}",
                metadata.head, metadata.tail, metadata.node_count
            )));
        }

        Ok(metadata)
    }
}

fn as_format(e: SortError) -> SortError {
    SortError::Format(e.to_string())
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    i64::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}
