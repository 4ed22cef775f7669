//! Configuration for regionstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{RegionError, Result};
use crate::region::LENGTH_PREFIX_SIZE;

/// Main configuration for an [`Engine`](crate::Engine) instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all region files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── region2d/        ({x}.{z}.2dr files)
    ///     └── region3d/        ({x}.{y}.{z}.3dr files)
    pub data_dir: PathBuf,

    /// Size of one allocation unit inside a region file (in bytes)
    pub sector_size: u32,

    /// Sync strategy: whether each write is followed by an fsync
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of threads in the worker pool used by the nonblocking facade
    pub worker_threads: usize,

    /// How long shutdown waits for in-flight work (milliseconds, 0 = forever)
    pub shutdown_timeout_ms: u64,
}

/// Region write sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Leave written data in OS buffers; the file is synced on close
    #[default]
    OsBuffered,

    /// fsync after every write (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./region_data"),
            sector_size: 512,
            sync_strategy: SyncStrategy::OsBuffered,
            worker_threads: 2,
            shutdown_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the values can back a working store
    pub fn validate(&self) -> Result<()> {
        if self.sector_size as usize <= LENGTH_PREFIX_SIZE {
            return Err(RegionError::Config(format!(
                "sector_size must be larger than {} bytes, got {}",
                LENGTH_PREFIX_SIZE, self.sector_size
            )));
        }
        if self.worker_threads == 0 {
            return Err(RegionError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
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
    /// Set the data directory (root for all region files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sector size (in bytes)
    pub fn sector_size(mut self, size: u32) -> Self {
        self.config.sector_size = size;
        self
    }

    /// Set the write sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the shutdown timeout (in milliseconds)
    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
