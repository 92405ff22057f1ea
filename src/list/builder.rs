//! List Builder
//!
//! Converts a Record Store into a disk linked list, one record at a time.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{record_buffer, Result};
use crate::store::RecordReader;

use super::{DiskList, ListNode, NodeHeader, NodeOffset};

/// Builder for a new list file
///
/// Nodes are appended in call order; `finish()` commits the metadata.
pub struct ListBuilder {
    list: DiskList,
    /// First node appended
    head: Option<NodeOffset>,
    /// Last node appended, kept so its `next` link can be patched
    last: Option<ListNode>,
    /// Nodes appended so far
    node_count: u64,
}

impl ListBuilder {
    /// Create the list file with an uncommitted metadata block
    pub fn new(path: &Path, record_size: usize) -> Result<Self> {
        Ok(Self {
            list: DiskList::create(path, record_size)?,
            head: None,
            last: None,
            node_count: 0,
        })
    }

    /// Append one record as the new tail
    ///
    /// Writes the node, then patches the previous tail's `next` link.
    pub fn add(&mut self, record: &[u8]) -> Result<NodeOffset> {
        let mut header = NodeHeader::new(self.list.metadata().record_size);
        header.prev = self.last.map(|node| node.offset);

        let offset = self.list.append_node(&header, record)?;

        match self.last.take() {
            Some(mut prev) => {
                prev.header.next = Some(offset);
                self.list.write_header(prev.offset, &prev.header)?;
            }
            None => self.head = Some(offset),
        }

        self.last = Some(ListNode { offset, header });
        self.node_count += 1;
        Ok(offset)
    }

    /// Nodes appended so far
    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Commit head, tail and count; the list becomes valid
    pub fn finish(mut self) -> Result<DiskList> {
        let tail = self.last.map(|node| node.offset);
        self.list.set_bounds(self.head, tail);
        self.list.set_node_count(self.node_count);
        self.list.commit()?;
        Ok(self.list)
    }
}

/// Build a list at `list_path` from every record of `source`
///
/// Holds one record buffer. A failure after the list file was created
/// removes it; earlier failures leave `list_path` alone.
pub fn build_list(source: &Path, list_path: &Path, record_size: usize) -> Result<DiskList> {
    let mut reader = RecordReader::open(source, record_size)?;
    let mut buf = record_buffer(record_size)?;
    let builder = ListBuilder::new(list_path, record_size)?;

    match stream_into_list(&mut reader, &mut buf, builder) {
        Ok(list) => {
            debug!(
                source = %source.display(),
                list = %list_path.display(),
                nodes = list.node_count(),
                "built disk list"
            );
            Ok(list)
        }
        Err(e) => {
            warn!(list = %list_path.display(), error = %e, "list build failed, removing file");
            if let Err(remove_err) = fs::remove_file(list_path) {
                debug!(error = %remove_err, "list file was not removed");
            }
            Err(e)
        }
    }
}

fn stream_into_list(reader: &mut RecordReader, buf: &mut [u8], mut builder: ListBuilder) -> Result<DiskList> {
    while reader.read_next(buf)? {
        builder.add(buf)?;
    }
    builder.finish()
}
