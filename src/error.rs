//! Error types for linksort
//!
//! Provides a unified error type for every build, sort, flatten and search
//! step. A search that finds nothing is not an error: it returns `Ok(None)`.

use thiserror::Error;

/// Result type alias using SortError
pub type Result<T> = std::result::Result<T, SortError>;

/// Unified error type for linksort operations
#[derive(Debug, Error)]
pub enum SortError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Memory Errors
    // -------------------------------------------------------------------------
    #[error("Allocation failed: {0}")]
    Allocation(String),

    // -------------------------------------------------------------------------
    // List Structure Errors
    // -------------------------------------------------------------------------
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Invalid list file: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Allocate a zeroed record buffer, reporting failure instead of aborting.
pub(crate) fn record_buffer(record_size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(record_size).map_err(|e| {
        SortError::Allocation(format!("{} byte record buffer: {}", record_size, e))
    })?;
    buf.resize(record_size, 0);
    Ok(buf)
}
