//! # linksort
//!
//! Out-of-core sorting and searching for files of fixed-size binary records:
//! - Records are threaded onto a doubly linked list stored on disk
//! - External bubble sort (payload swaps) and bottom-up merge sort (relinking)
//! - The sorted list is flattened back into a plain record file
//! - Binary point and range search over the flattened file
//!
//! Memory use is a handful of record buffers, independent of file size.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ExternalSorter (sorter)                    │
//! │              build → sort → flatten, search                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌─────────────┐   ┌─────────────┐
//!   │    list     │ │    sort     │   │   search    │
//!   │ (disk DLL)  │◀│bubble/merge │   │ point/range │
//!   └──────┬──────┘ └──────┬──────┘   └──────┬──────┘
//!          │               │                 │
//!          │        ┌──────▼──────┐          │
//!          │        │   compare   │◀─────────┤
//!          │        └─────────────┘          │
//!          ▼                                 ▼
//!   ┌─────────────────────────────────────────────┐
//!   │             store (record files)            │
//!   └─────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod list;
pub mod sort;
pub mod search;
pub mod compare;
pub mod record;
pub mod sorter;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SortError};
pub use config::{Config, SortAlgorithm};
pub use sorter::{sorted_file_name, sorted_file_name_at, ExternalSorter, SortReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linksort
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
