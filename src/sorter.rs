//! Sort Pipeline
//!
//! Ties the pieces together for whole-file use: build a transient list from
//! the input store, sort it, flatten it into the output store.
//!
//! ## Pipeline
//! ```text
//!   input store ──build──▶ temp list ──sort──▶ temp list ──flatten──▶ output store
//!                           (temp_dir)                                    │
//!                               └──────────── removed on every path ◀─────┘
//! ```
//!
//! The output is always a new store; naming the input as the output is a
//! `Config` error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::compare::RecordComparator;
use crate::config::{Config, SortAlgorithm};
use crate::error::{Result, SortError};
use crate::list::{build_list, flatten, FlattenOptions};
use crate::search::{search_point, search_range, MatchRange};
use crate::sort::{sort_list, verify_sorted, SortOptions};
use crate::store::RecordReader;

/// Summary of one `sort_file` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortReport {
    /// Records written to the output store
    pub records: u64,
    pub algorithm: SortAlgorithm,
    /// Merge rounds or bubble passes
    pub rounds_or_passes: u64,
    pub comparisons: u64,
    pub elapsed: Duration,
}

/// File-level front end over the list, sort and search modules
pub struct ExternalSorter {
    config: Config,
}

impl ExternalSorter {
    /// Create a sorter; the config is validated here
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sort every record of `input` into a new store at `output`
    pub fn sort_file<C>(&self, input: &Path, output: &Path, compare: &C) -> Result<SortReport>
    where
        C: RecordComparator + ?Sized,
    {
        let started = Instant::now();
        let algorithm = self.config.algorithm;
        check_distinct(input, output)?;

        fs::create_dir_all(&self.config.temp_dir)?;
        let temp = TempList::new(&self.config.temp_dir, algorithm);

        // Step 1: build and sort; the output is untouched so far
        let mut list = build_list(input, temp.path(), self.config.record_size)?;
        let stats = sort_list(&mut list, algorithm, SortOptions::from(&self.config), compare)?;

        // Step 2: flatten; a failure leaves a partial output behind
        let options = FlattenOptions {
            strict: self.config.strict_flatten,
            sync: self.config.sync_output,
        };
        let flattened = match flatten(&mut list, output, options) {
            Ok(flattened) => flattened,
            Err(e) => {
                warn!(output = %output.display(), error = %e, "flatten failed, removing output");
                remove_if_exists(output);
                return Err(e);
            }
        };
        drop(list);

        let report = SortReport {
            records: flattened.written,
            algorithm,
            rounds_or_passes: stats.iterations,
            comparisons: stats.comparisons,
            elapsed: started.elapsed(),
        };

        info!(
            input = %input.display(),
            output = %output.display(),
            records = report.records,
            algorithm = %algorithm,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "sorted record store"
        );
        Ok(report)
    }

    /// Point search over a sorted store
    pub fn search<C>(&self, sorted: &Path, key: &[u8], compare: &C) -> Result<Option<u64>>
    where
        C: RecordComparator + ?Sized,
    {
        let mut reader = RecordReader::open(sorted, self.config.record_size)?;
        search_point(&mut reader, key, compare)
    }

    /// Range search over a sorted store
    pub fn search_range<C>(&self, sorted: &Path, key: &[u8], compare: &C) -> Result<Option<MatchRange>>
    where
        C: RecordComparator + ?Sized,
    {
        let mut reader = RecordReader::open(sorted, self.config.record_size)?;
        search_range(&mut reader, key, compare)
    }

    /// First out-of-order record index in `path`, if any
    pub fn verify<C>(&self, path: &Path, compare: &C) -> Result<Option<u64>>
    where
        C: RecordComparator + ?Sized,
    {
        let mut reader = RecordReader::open(path, self.config.record_size)?;
        verify_sorted(&mut reader, compare)
    }
}

/// Conventional output name stamped with the local time,
/// e.g. `MergeSortedsales 2025-10-06 01-45.dat`
pub fn sorted_file_name(base: &str, algorithm: SortAlgorithm) -> String {
    sorted_file_name_at(base, algorithm, &Local::now())
}

/// `sorted_file_name` for a fixed timestamp
pub fn sorted_file_name_at(base: &str, algorithm: SortAlgorithm, at: &DateTime<Local>) -> String {
    format!(
        "{}Sorted{} {}.dat",
        algorithm.label(),
        base,
        at.format("%Y-%m-%d %H-%M")
    )
}

fn check_distinct(input: &Path, output: &Path) -> Result<()> {
    let same = match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(SortError::Config(format!(
            "output {} is the input; sorted output must be a new file",
            output.display()
        )));
    }
    Ok(())
}

// =============================================================================
// Temporary List File
// =============================================================================

/// Owns the transient list path and removes the file when dropped
struct TempList {
    path: PathBuf,
}

impl TempList {
    fn new(dir: &Path, algorithm: SortAlgorithm) -> Self {
        let name = format!(
            "temp_{}_list_{}_{}.dat",
            algorithm.label().to_ascii_lowercase(),
            process::id(),
            unix_time().as_nanos()
        );
        Self { path: dir.join(name) }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempList {
    fn drop(&mut self) {
        remove_if_exists(&self.path);
    }
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove file"),
    }
}

fn unix_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

