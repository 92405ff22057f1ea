//! Flattener
//!
//! Drains a list into a new Record Store in list order.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{record_buffer, Result, SortError};
use crate::store::RecordWriter;

use super::DiskList;

/// Flatten behavior switches
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    /// A short or overlong chain is an error instead of a warning
    pub strict: bool,
    /// fsync the destination before returning
    pub sync: bool,
}

/// Outcome of a flatten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenStats {
    /// Records written to the destination
    pub written: u64,
    /// Node count recorded in the list metadata
    pub expected: u64,
    /// The chain still had a successor after `expected` nodes
    pub overran: bool,
}

impl FlattenStats {
    pub fn is_complete(&self) -> bool {
        self.written == self.expected && !self.overran
    }
}

/// Write every payload of `list`, head to tail, into a store at `destination`
///
/// Walks at most `node_count` nodes so a broken or cyclic chain cannot loop.
pub fn flatten(list: &mut DiskList, destination: &Path, options: FlattenOptions) -> Result<FlattenStats> {
    let metadata = *list.metadata();
    let record_size = list.record_size();

    let mut buf = record_buffer(record_size)?;
    let mut writer = RecordWriter::create(destination, record_size)?;

    let mut current = metadata.head;
    while let Some(offset) = current {
        if writer.records_written() >= metadata.node_count {
            break;
        }
        let header = list.read_node(offset, &mut buf)?;
        writer.append(&buf)?;
        current = header.next;
    }

    let stats = FlattenStats {
        written: writer.finish(options.sync)?,
        expected: metadata.node_count,
        overran: current.is_some(),
    };

    if !stats.is_complete() {
        let message = format!(
            "expected {} records but wrote {}{}",
            stats.expected,
            stats.written,
            if stats.overran { " (chain continues past the tail)" } else { "" }
        );
        if options.strict {
            return Err(SortError::Structural(message));
        }
        warn!(list = %list.path().display(), "{}", message);
    }

    debug!(
        list = %list.path().display(),
        destination = %destination.display(),
        written = stats.written,
        "flattened disk list"
    );
    Ok(stats)
}
