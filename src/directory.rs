//! Region Directory
//!
//! Maps entry keys to region files inside one directory.
//!
//! ## Responsibilities
//! - Create the directory on open
//! - Open each region file lazily, on first use
//! - Keep at most one open `RegionStore` per file
//! - Route save/load/remove through the key's region and slot id

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{RegionError, Result};
use crate::key::{EntryKey, RegionKey};
use crate::region::RegionStore;

/// Directory of region files for one key dimensionality
///
/// ## Concurrency:
/// - `stores`: Protected by a Mutex held while a store is looked up or
///   opened, never while an entry is read or written
/// - Entry I/O is serialized per region by the store's own lock, so
///   different regions proceed in parallel
/// - All methods use `&self`
pub struct RegionDirectory<K: EntryKey> {
    /// Directory holding the region files
    dir: PathBuf,

    /// Sector size used for every region file
    sector_size: u32,

    /// Sync strategy handed to every store
    sync_strategy: SyncStrategy,

    /// Open stores, one per region file
    stores: Mutex<HashMap<K::Region, Arc<RegionStore>>>,

    /// Set once `close()` has run
    closed: AtomicBool,

    _key: PhantomData<fn() -> K>,
}

impl<K: EntryKey> RegionDirectory<K> {
    /// Open or create a region directory
    pub fn open(dir: &Path, sector_size: u32, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            sector_size,
            sync_strategy,
            stores: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            _key: PhantomData,
        })
    }

    /// Save an entry, creating its region file if needed
    pub fn save(&self, key: &K, data: &[u8]) -> Result<()> {
        self.store_for(key.region_key())?.write(key.id(), data)
    }

    /// Load an entry
    ///
    /// Returns `Ok(None)` if the entry, or its whole region, does not exist.
    /// A missing region file is not created.
    pub fn load(&self, key: &K) -> Result<Option<Vec<u8>>> {
        match self.existing_store_for(key.region_key())? {
            Some(store) => store.read(key.id()),
            None => Ok(None),
        }
    }

    /// Remove an entry, releasing its sectors
    pub fn remove(&self, key: &K) -> Result<()> {
        match self.existing_store_for(key.region_key())? {
            Some(store) => store.remove(key.id()),
            None => Ok(()),
        }
    }

    /// Get the store for a region, opening (and creating) its file on first use
    pub fn store_for(&self, region: K::Region) -> Result<Arc<RegionStore>> {
        let mut stores = self.stores.lock();
        self.ensure_open()?;

        if let Some(store) = stores.get(&region) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(RegionStore::open_with(
            &self.region_path(region),
            K::ENTRIES_PER_REGION,
            self.sector_size,
            self.sync_strategy,
        )?);
        stores.insert(region, Arc::clone(&store));

        Ok(store)
    }

    /// Region keys of all region files present in the directory, sorted
    pub fn regions(&self) -> Result<Vec<K::Region>> {
        let mut regions = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(region) = entry
                .file_name()
                .to_str()
                .and_then(K::Region::from_file_name)
            {
                regions.push(region);
            }
        }

        regions.sort();
        Ok(regions)
    }

    /// Close every open store
    ///
    /// All stores are closed even if one fails; the first error is returned.
    /// Later operations on the directory return `RegionError::Closed`.
    pub fn close(&self) -> Result<()> {
        let mut stores = self.stores.lock();
        self.closed.store(true, Ordering::SeqCst);

        let mut first_error = None;
        for (region, store) in stores.drain() {
            if let Err(e) = store.close() {
                tracing::error!("Failed to close region {:?}: {}", region, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of currently open stores
    pub fn open_region_count(&self) -> usize {
        self.stores.lock().len()
    }

    /// Get the directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Path of the file backing `region`
    fn region_path(&self, region: K::Region) -> PathBuf {
        self.dir.join(region.file_name())
    }

    /// Store for `region` if it is open or its file exists
    fn existing_store_for(&self, region: K::Region) -> Result<Option<Arc<RegionStore>>> {
        {
            let stores = self.stores.lock();
            self.ensure_open()?;
            if let Some(store) = stores.get(&region) {
                return Ok(Some(Arc::clone(store)));
            }
        }

        if !self.region_path(region).exists() {
            return Ok(None);
        }

        self.store_for(region).map(Some)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RegionError::Closed(format!(
                "region directory {}",
                self.dir.display()
            )));
        }
        Ok(())
    }
}
