//! External Bubble Sort
//!
//! Adjacent-pair passes over the list. Out-of-order neighbours exchange
//! payload bytes; headers are never rewritten, so the chain topology is the
//! same before and after.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::compare::RecordComparator;
use crate::error::{record_buffer, Result, SortError};
use crate::list::DiskList;

/// Counters from one bubble sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BubbleStats {
    pub passes: u64,
    pub swaps: u64,
    pub comparisons: u64,
}

/// Sort `list` by swapping adjacent payloads
///
/// Pass `p` compares the first `n - p` nodes; a pass without swaps ends the
/// sort. The record already in memory is carried to the next step, so each
/// step reads one node.
pub fn bubble_sort<C>(list: &mut DiskList, compare: &C, progress_interval: u64) -> Result<BubbleStats>
where
    C: RecordComparator + ?Sized,
{
    let node_count = list.node_count();
    let mut stats = BubbleStats::default();
    if node_count < 2 {
        return Ok(stats);
    }

    let head = list.head().ok_or_else(|| {
        SortError::Structural(format!("list of {} nodes has no head", node_count))
    })?;

    let mut current_buf = record_buffer(list.record_size())?;
    let mut next_buf = record_buffer(list.record_size())?;

    for pass in 0..node_count - 1 {
        if progress_interval > 0 && pass > 0 && pass % progress_interval == 0 {
            info!(
                pass,
                total = node_count - 1,
                percent = pass as f64 * 100.0 / (node_count - 1) as f64,
                "bubble sort progress"
            );
        }

        stats.passes += 1;
        let mut pass_swaps = 0u64;

        let mut current = head;
        let mut header = list.read_node(current, &mut current_buf)?;

        for _ in 0..node_count - pass - 1 {
            let next = header.next.ok_or_else(|| {
                SortError::Structural(format!(
                    "chain ends at node {} before reaching {} nodes",
                    current, node_count
                ))
            })?;
            header = list.read_node(next, &mut next_buf)?;

            stats.comparisons += 1;
            if compare(current_buf.as_slice(), next_buf.as_slice()) == Ordering::Greater {
                list.write_payload(current, &next_buf)?;
                list.write_payload(next, &current_buf)?;
                pass_swaps += 1;
                // current_buf now holds the record stored at `next`
            } else {
                std::mem::swap(&mut current_buf, &mut next_buf);
            }
            current = next;
        }

        stats.swaps += pass_swaps;
        debug!(pass, swaps = pass_swaps, "bubble pass complete");

        if pass_swaps == 0 {
            break;
        }
    }

    Ok(stats)
}
