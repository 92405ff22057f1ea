//! External Merge Sort
//!
//! Iterative bottom-up merge over the linked list. Each round walks the list
//! once, merging adjacent sublists of `size` nodes by relinking headers;
//! `size` starts at 1 and doubles until it covers the whole list.
//!
//! Sublists are delimited by counting nodes, never by following a chain to
//! its end, because the chain between runs is rewritten as the round
//! progresses. Every walk is bounded by the node count so a damaged or
//! cyclic chain becomes a structural error instead of a hang.

use std::cmp::Ordering;

use tracing::debug;

use crate::compare::RecordComparator;
use crate::error::{record_buffer, Result, SortError};
use crate::list::{DiskList, ListNode, NodeOffset};

/// Result of a merge sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedBounds {
    pub head: Option<NodeOffset>,
    pub tail: Option<NodeOffset>,
    pub rounds: u32,
    /// Pairs merged across all rounds
    pub merges: u64,
    pub comparisons: u64,
}

/// Sort the `node_count` nodes starting at `head`
///
/// Returns the new head and tail; the caller commits them to the metadata.
/// A list of zero or one node is returned unchanged.
pub fn merge_sort<C>(
    list: &mut DiskList,
    head: Option<NodeOffset>,
    node_count: u64,
    compare: &C,
    max_rounds: u32,
) -> Result<SortedBounds>
where
    C: RecordComparator + ?Sized,
{
    let mut bounds = SortedBounds {
        head,
        tail: head,
        rounds: 0,
        merges: 0,
        comparisons: 0,
    };
    if node_count <= 1 {
        return Ok(bounds);
    }

    let head = head.ok_or_else(|| {
        SortError::Structural(format!("list of {} nodes has no head", node_count))
    })?;
    bounds.tail = Some(find_tail(list, head, node_count)?);

    let mut bufs = MergeBuffers {
        left: record_buffer(list.record_size())?,
        right: record_buffer(list.record_size())?,
    };

    let mut current_head = head;
    let mut sublist_size: u64 = 1;

    while sublist_size < node_count {
        if bounds.rounds >= max_rounds {
            return Err(SortError::Structural(format!(
                "merge sort exceeded {} rounds with sublist size {} of {} nodes",
                max_rounds, sublist_size, node_count
            )));
        }
        bounds.rounds += 1;

        let round = merge_round(list, current_head, node_count, sublist_size, compare, &mut bufs)?;
        if round.merges == 0 {
            return Err(SortError::Structural(format!(
                "merge round {} performed no merges",
                bounds.rounds
            )));
        }

        debug!(
            round = bounds.rounds,
            sublist_size,
            merges = round.merges,
            "merge round complete"
        );

        bounds.merges += round.merges;
        bounds.comparisons += round.comparisons;
        current_head = round.head;
        bounds.tail = Some(round.tail);
        sublist_size = sublist_size.saturating_mul(2);
    }

    bounds.head = Some(current_head);
    Ok(bounds)
}

// =============================================================================
// Rounds
// =============================================================================

struct MergeBuffers {
    left: Vec<u8>,
    right: Vec<u8>,
}

struct RoundResult {
    head: NodeOffset,
    tail: NodeOffset,
    merges: u64,
    comparisons: u64,
}

/// A sorted run whose tail header matches the disk
struct Run {
    head: NodeOffset,
    tail: ListNode,
}

/// Nodes counted from a sublist start
struct Counted {
    first: ListNode,
    last: ListNode,
    len: u64,
}

fn merge_round<C>(
    list: &mut DiskList,
    head: NodeOffset,
    node_count: u64,
    sublist_size: u64,
    compare: &C,
    bufs: &mut MergeBuffers,
) -> Result<RoundResult>
where
    C: RecordComparator + ?Sized,
{
    let mut out_head: Option<NodeOffset> = None;
    let mut out_tail: Option<ListNode> = None;
    let mut position = Some(head);
    let mut visited = 0u64;
    let mut merges = 0u64;
    let mut comparisons = 0u64;

    while let Some(start) = position {
        let a = count_sublist(list, start, sublist_size, node_count - visited, node_count)?;
        visited += a.len;

        let run = match a.last.header.next {
            // No second sublist: the remainder is carried over unmerged
            None => {
                position = None;
                Run {
                    head: a.first.offset,
                    tail: a.last,
                }
            }
            Some(b_start) => {
                let b = count_sublist(list, b_start, sublist_size, node_count - visited, node_count)?;
                visited += b.len;
                position = b.last.header.next;
                merges += 1;
                merge_pair(list, (start, a.len), (b_start, b.len), compare, bufs, &mut comparisons)?
            }
        };

        match out_tail {
            None => {
                out_head = Some(run.head);
                out_tail = Some(run.tail);
            }
            Some(mut tail) => {
                let mut run_head = ListNode {
                    offset: run.head,
                    header: list.read_header(run.head)?,
                };
                list.link(&mut tail, &mut run_head)?;
                out_tail = Some(if run.tail.offset == run_head.offset {
                    run_head
                } else {
                    run.tail
                });
            }
        }
    }

    if visited != node_count {
        return Err(SortError::Structural(format!(
            "merge round visited {} nodes, list has {}",
            visited, node_count
        )));
    }

    match (out_head, out_tail) {
        (Some(head), Some(tail)) => Ok(RoundResult {
            head,
            tail: tail.offset,
            merges,
            comparisons,
        }),
        _ => Err(SortError::Structural("merge round produced an empty list".into())),
    }
}

/// Walk up to `sublist_size` nodes from `start` (header-only reads)
fn count_sublist(
    list: &mut DiskList,
    start: NodeOffset,
    sublist_size: u64,
    remaining: u64,
    node_count: u64,
) -> Result<Counted> {
    if remaining == 0 {
        return Err(SortError::Structural(format!(
            "chain continues past {} nodes at offset {}",
            node_count, start
        )));
    }

    let limit = sublist_size.min(remaining);
    let first = ListNode {
        offset: start,
        header: list.read_header(start)?,
    };

    let mut last = first;
    let mut len = 1;
    while len < limit {
        match last.header.next {
            Some(next) => {
                last = ListNode {
                    offset: next,
                    header: list.read_header(next)?,
                };
                len += 1;
            }
            None => break,
        }
    }

    Ok(Counted { first, last, len })
}

// =============================================================================
// Pair Merge
// =============================================================================

/// One input of a pair merge with its next record pre-read
struct Side {
    node: Option<ListNode>,
    /// Nodes of this side not yet read
    unread: u64,
}

impl Side {
    fn start(list: &mut DiskList, offset: NodeOffset, len: u64, buf: &mut [u8]) -> Result<Self> {
        let header = list.read_node(offset, buf)?;
        Ok(Self {
            node: Some(ListNode { offset, header }),
            unread: len - 1,
        })
    }

    /// Hand out the pre-read node and pre-read its successor if one remains
    fn take(&mut self, list: &mut DiskList, buf: &mut [u8]) -> Result<ListNode> {
        let taken = self
            .node
            .take()
            .ok_or_else(|| SortError::Structural("merge side already exhausted".into()))?;

        if self.unread > 0 {
            let next = taken.header.next.ok_or_else(|| {
                SortError::Structural(format!(
                    "sublist ends at node {} with {} nodes still expected",
                    taken.offset, self.unread
                ))
            })?;
            let header = list.read_node(next, buf)?;
            self.node = Some(ListNode { offset: next, header });
            self.unread -= 1;
        }

        Ok(taken)
    }
}

/// Merge two counted sublists into one run; ties go to the first sublist
fn merge_pair<C>(
    list: &mut DiskList,
    a: (NodeOffset, u64),
    b: (NodeOffset, u64),
    compare: &C,
    bufs: &mut MergeBuffers,
    comparisons: &mut u64,
) -> Result<Run>
where
    C: RecordComparator + ?Sized,
{
    let mut left = Side::start(list, a.0, a.1, &mut bufs.left)?;
    let mut right = Side::start(list, b.0, b.1, &mut bufs.right)?;

    let mut head: Option<NodeOffset> = None;
    let mut tail: Option<ListNode> = None;

    loop {
        let take_left = match (left.node.is_some(), right.node.is_some()) {
            (true, true) => {
                *comparisons += 1;
                compare(bufs.left.as_slice(), bufs.right.as_slice()) != Ordering::Greater
            }
            (true, false) => true,
            (false, true) => false,
            (false, false) => break,
        };

        let mut node = if take_left {
            left.take(list, &mut bufs.left)?
        } else {
            right.take(list, &mut bufs.right)?
        };
        // Successor already cached by `take`; the node becomes the run's end
        node.header.prev = None;
        node.header.next = None;

        match tail.as_mut() {
            None => {
                list.write_header(node.offset, &node.header)?;
                head = Some(node.offset);
            }
            Some(prev) => list.link(prev, &mut node)?,
        }
        tail = Some(node);
    }

    match (head, tail) {
        (Some(head), Some(tail)) => Ok(Run { head, tail }),
        _ => Err(SortError::Structural("merged an empty pair".into())),
    }
}

// =============================================================================
// Initial Traversal
// =============================================================================

/// Walk exactly `node_count` nodes and check the chain ends there
fn find_tail(list: &mut DiskList, head: NodeOffset, node_count: u64) -> Result<NodeOffset> {
    let mut current = head;
    for step in 1..node_count {
        let header = list.read_header(current)?;
        current = header.next.ok_or_else(|| {
            SortError::Structural(format!(
                "chain ends after {} of {} nodes",
                step, node_count
            ))
        })?;
    }

    if list.read_header(current)?.next.is_some() {
        return Err(SortError::Structural(format!(
            "chain continues past {} nodes",
            node_count
        )));
    }
    Ok(current)
}
