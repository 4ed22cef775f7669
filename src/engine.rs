//! Engine Module
//!
//! The top-level save: one region directory for 2D entries and one for 3D
//! entries under a shared data directory.
//!
//! ## Responsibilities
//! - Create the data directory layout on open
//! - Route 2D and 3D keys to their region directories
//! - Close every open region file on shutdown

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::directory::RegionDirectory;
use crate::error::Result;
use crate::key::{EntryKey2D, EntryKey3D};

/// The main storage engine
///
/// ## Concurrency Model
///
/// All methods take `&self` and can be called from any number of threads.
/// Entries in the same region are serialized by that region's store lock;
/// entries in different regions (or different dimensionalities) never wait
/// on each other, and nothing is atomic across regions.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Region files for 2D entries
    columns: RegionDirectory<EntryKey2D>,

    /// Region files for 3D entries
    cubes: RegionDirectory<EntryKey3D>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const REGION_2D_DIR: &'static str = "region2d";
    const REGION_3D_DIR: &'static str = "region3d";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Create the data directory and both region subdirectories
    /// 3. Ready to serve requests (region files open lazily)
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Reject configs that cannot back a store
        config.validate()?;

        // Step 2: Directory layout
        fs::create_dir_all(&config.data_dir)?;

        let columns = RegionDirectory::open(
            &config.data_dir.join(Self::REGION_2D_DIR),
            config.sector_size,
            config.sync_strategy,
        )?;
        let cubes = RegionDirectory::open(
            &config.data_dir.join(Self::REGION_3D_DIR),
            config.sector_size,
            config.sync_strategy,
        )?;

        tracing::info!(
            "Opened region storage at {} (sector size {})",
            config.data_dir.display(),
            config.sector_size
        );

        Ok(Self {
            config,
            columns,
            cubes,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Save a 2D entry
    pub fn save_2d(&self, key: EntryKey2D, data: &[u8]) -> Result<()> {
        self.columns.save(&key, data)
    }

    /// Save a 3D entry
    pub fn save_3d(&self, key: EntryKey3D, data: &[u8]) -> Result<()> {
        self.cubes.save(&key, data)
    }

    /// Load a 2D entry (`None` if never written)
    pub fn load_2d(&self, key: EntryKey2D) -> Result<Option<Vec<u8>>> {
        self.columns.load(&key)
    }

    /// Load a 3D entry (`None` if never written)
    pub fn load_3d(&self, key: EntryKey3D) -> Result<Option<Vec<u8>>> {
        self.cubes.load(&key)
    }

    /// Remove a 2D entry
    pub fn remove_2d(&self, key: EntryKey2D) -> Result<()> {
        self.columns.remove(&key)
    }

    /// Remove a 3D entry
    pub fn remove_3d(&self, key: EntryKey3D) -> Result<()> {
        self.cubes.remove(&key)
    }

    /// Close the engine gracefully
    ///
    /// Syncs and closes every open region file. Both directories are closed
    /// even if the first one fails.
    pub fn close(&self) -> Result<()> {
        let columns = self.columns.close();
        let cubes = self.cubes.close();
        columns?;
        cubes?;

        tracing::info!("Closed region storage at {}", self.config.data_dir.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the 2D region directory path
    pub fn region_2d_dir(&self) -> PathBuf {
        self.config.data_dir.join(Self::REGION_2D_DIR)
    }

    /// Get the 3D region directory path
    pub fn region_3d_dir(&self) -> PathBuf {
        self.config.data_dir.join(Self::REGION_3D_DIR)
    }

    /// Region directory holding 2D entries
    pub fn columns(&self) -> &RegionDirectory<EntryKey2D> {
        &self.columns
    }

    /// Region directory holding 3D entries
    pub fn cubes(&self) -> &RegionDirectory<EntryKey3D> {
        &self.cubes
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
