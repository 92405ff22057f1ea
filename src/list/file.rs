//! Disk List Handle
//!
//! Point reads and writes of single nodes. Every sort algorithm touches the
//! list only through these methods.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SortError};

use super::{
    ListMetadata, ListNode, NodeHeader, NodeOffset, METADATA_SIZE, NODE_HEADER_SIZE,
};

/// An open disk linked list file
pub struct DiskList {
    /// Path to the list file
    path: PathBuf,
    /// Read/write handle, positioned by every call
    file: File,
    /// In-memory copy of the metadata block (written by `commit`)
    metadata: ListMetadata,
    /// First byte after the last node
    end_offset: u64,
}

impl DiskList {
    /// Create an empty list file with an uncommitted metadata block
    pub(super) fn create(path: &Path, record_size: usize) -> Result<Self> {
        if record_size == 0 {
            return Err(SortError::Config("record_size must be greater than zero".into()));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        // Zeroed placeholder: no magic until the build commits
        file.write_all(&[0u8; METADATA_SIZE as usize])?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            metadata: ListMetadata::empty(record_size as u64),
            end_offset: METADATA_SIZE,
        })
    }

    /// Open a committed list file for sorting or flattening
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut block = [0u8; METADATA_SIZE as usize];
        if let Err(e) = file.read_exact(&mut block) {
            return Err(if e.kind() == ErrorKind::UnexpectedEof {
                SortError::Format(format!(
                    "{} is shorter than the metadata block",
                    path.display()
                ))
            } else {
                SortError::Io(e)
            });
        }
        let metadata = ListMetadata::decode(&block)?;
        let end_offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            metadata,
            end_offset,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &ListMetadata {
        &self.metadata
    }

    pub fn record_size(&self) -> usize {
        self.metadata.record_size as usize
    }

    pub fn node_count(&self) -> u64 {
        self.metadata.node_count
    }

    pub fn head(&self) -> Option<NodeOffset> {
        self.metadata.head
    }

    pub fn tail(&self) -> Option<NodeOffset> {
        self.metadata.tail
    }

    // =========================================================================
    // Node I/O
    // =========================================================================

    /// Read only the header of the node at `offset`
    pub fn read_header(&mut self, offset: NodeOffset) -> Result<NodeHeader> {
        self.check_offset(offset)?;
        self.file.seek(SeekFrom::Start(offset.get()))?;

        let mut bytes = [0u8; NODE_HEADER_SIZE as usize];
        self.file.read_exact(&mut bytes)?;
        let header = NodeHeader::decode(&bytes)?;

        if header.data_size != self.metadata.record_size {
            return Err(SortError::Structural(format!(
                "node at {} has data size {}, list record size is {}",
                offset, header.data_size, self.metadata.record_size
            )));
        }
        Ok(header)
    }

    /// Read the header and payload of the node at `offset`
    pub fn read_node(&mut self, offset: NodeOffset, payload: &mut [u8]) -> Result<NodeHeader> {
        self.check_payload(payload.len())?;
        let header = self.read_header(offset)?;
        // The handle sits right after the header
        self.file.read_exact(payload)?;
        Ok(header)
    }

    /// Write header and payload together
    pub fn write_node(&mut self, offset: NodeOffset, header: &NodeHeader, payload: &[u8]) -> Result<()> {
        self.check_payload(payload.len())?;
        self.check_header(offset, header)?;
        self.check_offset(offset)?;
        self.put_node(offset, header, payload)
    }

    /// Rewrite only the links of a node; the payload is untouched
    pub fn write_header(&mut self, offset: NodeOffset, header: &NodeHeader) -> Result<()> {
        self.check_header(offset, header)?;
        self.check_offset(offset)?;

        self.file.seek(SeekFrom::Start(offset.get()))?;
        self.file.write_all(&header.encode())?;
        Ok(())
    }

    /// Rewrite only the payload of a node; the links are untouched
    pub fn write_payload(&mut self, offset: NodeOffset, payload: &[u8]) -> Result<()> {
        self.check_payload(payload.len())?;
        self.check_offset(offset)?;

        self.file.seek(SeekFrom::Start(offset.payload_offset()))?;
        self.file.write_all(payload)?;
        Ok(())
    }

    /// Write a new node after the last one and return its offset
    pub(super) fn append_node(&mut self, header: &NodeHeader, payload: &[u8]) -> Result<NodeOffset> {
        let offset = NodeOffset::new(self.end_offset);
        self.check_payload(payload.len())?;
        self.check_header(offset, header)?;

        self.put_node(offset, header, payload)?;
        self.end_offset += self.metadata.node_size();
        Ok(offset)
    }

    fn put_node(&mut self, offset: NodeOffset, header: &NodeHeader, payload: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset.get()))?;
        self.file.write_all(&header.encode())?;
        self.file.write_all(payload)?;
        Ok(())
    }

    /// Make `right` the successor of `left`, updating both headers on disk
    ///
    /// Both cached headers are modified so callers keep an accurate copy.
    pub fn link(&mut self, left: &mut ListNode, right: &mut ListNode) -> Result<()> {
        if left.offset == right.offset {
            return Err(SortError::Structural(format!(
                "cannot link node {} to itself",
                left.offset
            )));
        }

        left.header.next = Some(right.offset);
        right.header.prev = Some(left.offset);

        self.write_header(left.offset, &left.header)?;
        self.write_header(right.offset, &right.header)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Replace head and tail in the in-memory metadata
    pub fn set_bounds(&mut self, head: Option<NodeOffset>, tail: Option<NodeOffset>) {
        self.metadata.head = head;
        self.metadata.tail = tail;
    }

    pub(super) fn set_node_count(&mut self, node_count: u64) {
        self.metadata.node_count = node_count;
    }

    /// Write the in-memory metadata to offset 0
    pub fn commit(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.metadata.encode())?;
        self.file.flush()?;
        Ok(())
    }

    /// fsync the list file
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Close and delete the list file
    pub fn remove(self) -> Result<()> {
        let path = self.path;
        drop(self.file);
        fs::remove_file(path)?;
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn check_offset(&self, offset: NodeOffset) -> Result<()> {
        let raw = offset.get();
        if raw < METADATA_SIZE {
            return Err(SortError::Structural(format!(
                "offset {} points into the metadata block",
                raw
            )));
        }
        if (raw - METADATA_SIZE) % self.metadata.node_size() != 0 {
            return Err(SortError::Structural(format!(
                "offset {} is not on a node boundary (node size {})",
                raw,
                self.metadata.node_size()
            )));
        }
        if raw.saturating_add(self.metadata.node_size()) > self.end_offset {
            return Err(SortError::Structural(format!(
                "offset {} is past the last node (file ends at {})",
                raw, self.end_offset
            )));
        }
        Ok(())
    }

    fn check_payload(&self, len: usize) -> Result<()> {
        if len as u64 != self.metadata.record_size {
            return Err(SortError::Structural(format!(
                "payload buffer of {} bytes for {} byte records",
                len, self.metadata.record_size
            )));
        }
        Ok(())
    }

    fn check_header(&self, offset: NodeOffset, header: &NodeHeader) -> Result<()> {
        if header.data_size != self.metadata.record_size {
            return Err(SortError::Structural(format!(
                "header for node {} declares {} bytes, list record size is {}",
                offset, header.data_size, self.metadata.record_size
            )));
        }
        Ok(())
    }
}
