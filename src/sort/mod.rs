//! Sort Module
//!
//! External sorts over a [`DiskList`]. Both algorithms hold two record
//! buffers no matter how many nodes the list has.
//!
//! ## Algorithms
//! - **Bubble**: swaps payload bytes of adjacent nodes; links never change.
//! - **Merge**: iterative bottom-up merge that relinks nodes; payloads never
//!   move. Head and tail change, so the metadata is rewritten afterwards.

mod bubble;
mod merge;
mod verify;

pub use bubble::{bubble_sort, BubbleStats};
pub use merge::{merge_sort, SortedBounds};
pub use verify::verify_sorted;

use tracing::info;

use crate::compare::RecordComparator;
use crate::config::{Config, SortAlgorithm};
use crate::error::Result;
use crate::list::DiskList;

/// Tuning shared by both algorithms
#[derive(Debug, Clone, Copy)]
pub struct SortOptions {
    /// Merge rounds allowed before the list is declared corrupt
    pub max_merge_rounds: u32,
    /// Bubble passes between progress logs (0 disables)
    pub progress_interval: u64,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            max_merge_rounds: 64,
            progress_interval: 100,
        }
    }
}

impl From<&Config> for SortOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_merge_rounds: config.max_merge_rounds,
            progress_interval: config.bubble_progress_interval,
        }
    }
}

/// What a sort did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStats {
    pub algorithm: SortAlgorithm,
    pub node_count: u64,
    /// Bubble passes or merge rounds
    pub iterations: u64,
    /// Payload swaps or pair merges
    pub moves: u64,
    pub comparisons: u64,
}

/// Sort `list` in place and commit the resulting head and tail
pub fn sort_list<C>(
    list: &mut DiskList,
    algorithm: SortAlgorithm,
    options: SortOptions,
    compare: &C,
) -> Result<SortStats>
where
    C: RecordComparator + ?Sized,
{
    let node_count = list.node_count();

    let stats = match algorithm {
        SortAlgorithm::Bubble => {
            let bubble = bubble_sort(list, compare, options.progress_interval)?;
            SortStats {
                algorithm,
                node_count,
                iterations: bubble.passes,
                moves: bubble.swaps,
                comparisons: bubble.comparisons,
            }
        }
        SortAlgorithm::Merge => {
            let head = list.head();
            let bounds = merge_sort(list, head, node_count, compare, options.max_merge_rounds)?;
            list.set_bounds(bounds.head, bounds.tail);
            list.commit()?;
            SortStats {
                algorithm,
                node_count,
                iterations: u64::from(bounds.rounds),
                moves: bounds.merges,
                comparisons: bounds.comparisons,
            }
        }
    };

    info!(
        algorithm = %algorithm,
        nodes = node_count,
        iterations = stats.iterations,
        comparisons = stats.comparisons,
        "sorted disk list"
    );
    Ok(stats)
}
