//! # regionstore
//!
//! A region-file storage engine for sparse grids of binary blobs:
//! - One blob per integer coordinate, 2D or 3D
//! - Nearby coordinates share one region file
//! - Blobs packed into fixed-size sectors, updated and freed in place
//! - Per-region locking, optional worker-pool front end
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  NonblockingStorage                          │
//! │           (WorkerPool + callbacks, optional)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │              region2d/         region3d/                     │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │ RegionDirectory │            │ RegionDirectory │
//!   │  <EntryKey2D>   │            │  <EntryKey3D>   │
//!   └────────┬────────┘            └────────┬────────┘
//!            │  key → (region, slot id)     │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │   RegionStore   │   ...      │   RegionStore   │
//!   │ (header+bitmap) │            │ (header+bitmap) │
//!   └─────────────────┘            └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod region;
pub mod directory;
pub mod engine;
pub mod nonblocking;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RegionError, Result};
pub use config::{Config, SyncStrategy};
pub use key::{EntryKey, EntryKey2D, EntryKey3D, RegionKey, RegionKey2D, RegionKey3D};
pub use region::{RegionStore, SectorLocation};
pub use directory::RegionDirectory;
pub use engine::Engine;
pub use nonblocking::{NonblockingStorage, WorkerPool};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of regionstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
