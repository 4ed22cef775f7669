//! Error types for regionstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RegionError
pub type Result<T> = std::result::Result<T, RegionError>;

/// Unified error type for regionstore operations
#[derive(Debug, Error)]
pub enum RegionError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Data Integrity Errors
    // -------------------------------------------------------------------------
    /// A stored length prefix claims more bytes than its sectors can hold
    #[error("Corrupted data: expected data size max {expected_max} but found {found}")]
    CorruptedData { expected_max: u64, found: u64 },

    /// The header table references sectors it cannot own
    #[error("Corrupted region header: {0}")]
    CorruptedHeader(String),

    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    /// The entry needs more sectors than a descriptor can count
    #[error("Entry too large: {size} bytes needs {sectors} sectors (max {max_sectors})")]
    EntryTooLarge {
        size: usize,
        sectors: u64,
        max_sectors: u32,
    },

    /// No sector offset representable in a descriptor is left
    #[error("Region full: sector offset {offset} does not fit in a descriptor")]
    RegionFull { offset: u64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Closed: {0}")]
    Closed(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}
