//! Configuration for linksort
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SortError};

/// Main configuration for an external sort
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Size in bytes of every record in the input store
    pub record_size: usize,

    // -------------------------------------------------------------------------
    // Sort Configuration
    // -------------------------------------------------------------------------
    /// Algorithm used to order the linked list
    pub algorithm: SortAlgorithm,

    /// Directory for the transient linked list file
    pub temp_dir: PathBuf,

    /// Upper bound on merge rounds before the list is declared corrupt
    pub max_merge_rounds: u32,

    /// Log bubble sort progress every N passes (0 disables)
    pub bubble_progress_interval: u64,

    // -------------------------------------------------------------------------
    // Output Configuration
    // -------------------------------------------------------------------------
    /// Fail instead of warning when the flattened count differs from the list count
    pub strict_flatten: bool,

    /// fsync the sorted store before returning
    pub sync_output: bool,
}

/// External sort algorithm over the disk linked list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAlgorithm {
    /// Adjacent payload swaps, O(n²) comparisons
    Bubble,

    /// Iterative bottom-up merge by relinking, O(n log n)
    Merge,
}

impl SortAlgorithm {
    /// Name used in temporary and sorted file names
    pub fn label(&self) -> &'static str {
        match self {
            SortAlgorithm::Bubble => "Bubble",
            SortAlgorithm::Merge => "Merge",
        }
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortAlgorithm {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bubble" => Ok(SortAlgorithm::Bubble),
            "merge" => Ok(SortAlgorithm::Merge),
            other => Err(SortError::Config(format!("Unknown sort algorithm: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_size: 4,
            algorithm: SortAlgorithm::Merge,
            temp_dir: std::env::temp_dir(),
            max_merge_rounds: 64, // log2 of any addressable node count
            bubble_progress_interval: 100,
            strict_flatten: false,
            sync_output: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no sort can run with
    pub fn validate(&self) -> Result<()> {
        if self.record_size == 0 {
            return Err(SortError::Config("record_size must be greater than zero".into()));
        }
        if self.max_merge_rounds == 0 {
            return Err(SortError::Config("max_merge_rounds must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the record size (in bytes)
    pub fn record_size(mut self, size: usize) -> Self {
        self.config.record_size = size;
        self
    }

    /// Set the sort algorithm
    pub fn algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Set the directory for temporary list files
    pub fn temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = path.into();
        self
    }

    /// Set the merge round cap
    pub fn max_merge_rounds(mut self, rounds: u32) -> Self {
        self.config.max_merge_rounds = rounds;
        self
    }

    /// Set how often bubble sort logs progress (in passes)
    pub fn bubble_progress_interval(mut self, passes: u64) -> Self {
        self.config.bubble_progress_interval = passes;
        self
    }

    /// Treat a short flatten as an error
    pub fn strict_flatten(mut self, strict: bool) -> Self {
        self.config.strict_flatten = strict;
        self
    }

    /// Set whether the sorted output is fsynced
    pub fn sync_output(mut self, sync: bool) -> Self {
        self.config.sync_output = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
