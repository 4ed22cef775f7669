//! Region Store
//!
//! Sector allocator and entry I/O for one region file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::{BufMut, BytesMut};
use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{RegionError, Result};

use super::bitmap::SectorBitmap;
use super::{header_sectors, HeaderTable, SectorLocation, LENGTH_PREFIX_SIZE};

/// One open region file
///
/// ## Concurrency
/// Every read, write and remove runs under a single mutex, so operations on
/// one store are serialized and see each other's results. Stores for
/// different files are fully independent.
///
/// The mutex only protects anything if this is the *only* open store for its
/// file. Callers must not open the same path twice at once;
/// [`RegionDirectory`](crate::directory::RegionDirectory) guarantees this.
pub struct RegionStore {
    /// Path of the backing file
    path: PathBuf,

    /// Number of slots in the header table
    entries_per_region: usize,

    /// Allocation unit in bytes
    sector_size: u32,

    /// Sectors permanently reserved by the header table
    header_sectors: u64,

    /// Whether writes are followed by an fsync
    sync_strategy: SyncStrategy,

    /// File handle and allocation state (`None` once closed)
    inner: Mutex<Option<RegionFile>>,
}

/// State owned by the store's lock
struct RegionFile {
    file: File,
    header: HeaderTable,
    used: SectorBitmap,
}

impl RegionStore {
    /// Open or create a region file with OS-buffered writes
    pub fn open(path: &Path, entries_per_region: usize, sector_size: u32) -> Result<Self> {
        Self::open_with(path, entries_per_region, sector_size, SyncStrategy::default())
    }

    /// Open or create a region file
    ///
    /// On open:
    /// 1. Open/create the backing file
    /// 2. Reserve the header sectors
    /// 3. Zero-extend the file to hold the full header table
    /// 4. Load the header table
    /// 5. Mark every written entry's sectors as used
    pub fn open_with(
        path: &Path,
        entries_per_region: usize,
        sector_size: u32,
        sync_strategy: SyncStrategy,
    ) -> Result<Self> {
        if sector_size as usize <= LENGTH_PREFIX_SIZE {
            return Err(RegionError::Config(format!(
                "sector_size must be larger than {} bytes, got {}",
                LENGTH_PREFIX_SIZE, sector_size
            )));
        }
        if entries_per_region == 0 {
            return Err(RegionError::Config(
                "entries_per_region must be at least 1".to_string(),
            ));
        }

        // Step 1: Open or create the file
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        // Step 2: Header sectors are never available to entries
        let header_sectors = header_sectors(entries_per_region, sector_size);
        let mut used = SectorBitmap::new();
        used.set_range(0, header_sectors);

        // Step 3: Make sure the whole header table exists on disk
        let header_len = HeaderTable::byte_len(entries_per_region);
        if file.metadata()?.len() < header_len {
            file.set_len(header_len)?;
        }

        // Step 4: Load the header table
        let mut bytes = vec![0u8; header_len as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut bytes)?;
        let header = HeaderTable::from_bytes(&bytes, entries_per_region);

        // Step 5: Rebuild the bitmap from the written entries
        for (id, location) in header.allocated() {
            let offset = location.offset() as u64;
            let count = location.count() as u64;

            if offset < header_sectors {
                return Err(RegionError::CorruptedHeader(format!(
                    "slot {} in {} points at sector {} inside the header ({} sectors)",
                    id,
                    path.display(),
                    offset,
                    header_sectors
                )));
            }

            if !used.is_range_free(offset, count) {
                tracing::warn!(
                    "Slot {} in {} overlaps another entry (sectors {}..{})",
                    id,
                    path.display(),
                    offset,
                    offset + count
                );
            }
            used.set_range(offset, count);
        }

        tracing::debug!(
            "Opened region {} ({} entries, {} used sectors)",
            path.display(),
            header.allocated().count(),
            used.used_count()
        );

        Ok(Self {
            path: path.to_path_buf(),
            entries_per_region,
            sector_size,
            header_sectors,
            sync_strategy,
            inner: Mutex::new(Some(RegionFile { file, header, used })),
        })
    }

    /// Write an entry, replacing whatever the slot held before
    ///
    /// Steps:
    /// 1. Pick a location (shrink in place, grow in place, or first fit)
    /// 2. Write length prefix and payload
    /// 3. Persist the slot's location in the header table
    /// 4. Free the old sectors and mark the new ones used
    pub fn write(&self, id: usize, data: &[u8]) -> Result<()> {
        let mut guard = self.inner.lock();
        let region = self.open_region(&mut guard)?;
        let old = self.slot(region, id)?;

        // Step 1: Choose where the entry goes
        let location = self.find_location(&region.used, old, data.len())?;

        // Step 2: Length prefix + payload in one write
        let mut entry = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + data.len());
        entry.put_u32(data.len() as u32);
        entry.put_slice(data);

        region
            .file
            .seek(SeekFrom::Start(self.sector_position(location)))?;
        region.file.write_all(&entry)?;

        // Step 3: Header update
        Self::write_location(&mut region.file, id, location)?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            region.file.sync_data()?;
        }
        region.header.set(id, location);

        // Step 4: Clear old range first; in-place moves overlap the new one
        region
            .used
            .clear_range(old.offset() as u64, old.count() as u64);
        region
            .used
            .set_range(location.offset() as u64, location.count() as u64);

        tracing::trace!(
            "Wrote {} bytes to slot {} at sectors {}..{}",
            data.len(),
            id,
            location.offset(),
            location.end()
        );

        Ok(())
    }

    /// Read an entry
    ///
    /// Returns:
    /// - `Ok(Some(data))`: slot holds an entry
    /// - `Ok(None)`: slot was never written (or was removed)
    /// - `Err(CorruptedData)`: length prefix exceeds the reserved sectors
    pub fn read(&self, id: usize) -> Result<Option<Vec<u8>>> {
        let mut guard = self.inner.lock();
        let region = self.open_region(&mut guard)?;
        let location = self.slot(region, id)?;

        if location.is_empty() {
            return Ok(None);
        }

        region
            .file
            .seek(SeekFrom::Start(self.sector_position(location)))?;

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        region.file.read_exact(&mut prefix)?;
        let length = u32::from_be_bytes(prefix) as u64;

        let expected_max = location.count() as u64 * self.sector_size as u64;
        if length > expected_max {
            return Err(RegionError::CorruptedData {
                expected_max,
                found: length,
            });
        }

        let mut data = vec![0u8; length as usize];
        region.file.read_exact(&mut data)?;

        Ok(Some(data))
    }

    /// Remove an entry and release its sectors
    ///
    /// Removing a slot that holds nothing is a no-op.
    pub fn remove(&self, id: usize) -> Result<()> {
        let mut guard = self.inner.lock();
        let region = self.open_region(&mut guard)?;
        let old = self.slot(region, id)?;

        if old.is_empty() {
            return Ok(());
        }

        Self::write_location(&mut region.file, id, SectorLocation::EMPTY)?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            region.file.sync_data()?;
        }
        region.header.set(id, SectorLocation::EMPTY);
        region
            .used
            .clear_range(old.offset() as u64, old.count() as u64);

        Ok(())
    }

    /// Close the store
    ///
    /// Syncs and releases the file handle. Later operations return
    /// `RegionError::Closed`; closing twice is harmless.
    pub fn close(&self) -> Result<()> {
        let region = self.inner.lock().take();
        if let Some(region) = region {
            region.file.sync_all()?;
            tracing::debug!("Closed region {}", self.path.display());
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Current location of a slot
    pub fn location(&self, id: usize) -> Result<SectorLocation> {
        let mut guard = self.inner.lock();
        let region = self.open_region(&mut guard)?;
        self.slot(region, id)
    }

    /// Copy of the header table
    pub fn header(&self) -> Result<HeaderTable> {
        let mut guard = self.inner.lock();
        Ok(self.open_region(&mut guard)?.header.clone())
    }

    /// Number of written slots
    pub fn entry_count(&self) -> Result<usize> {
        let mut guard = self.inner.lock();
        Ok(self.open_region(&mut guard)?.header.allocated().count())
    }

    /// Number of used sectors, header included
    pub fn used_sectors(&self) -> Result<u64> {
        let mut guard = self.inner.lock();
        Ok(self.open_region(&mut guard)?.used.used_count())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    pub fn entries_per_region(&self) -> usize {
        self.entries_per_region
    }

    /// Number of sectors reserved by the header table
    pub fn header_sectors(&self) -> u64 {
        self.header_sectors
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn open_region<'a>(&self, guard: &'a mut Option<RegionFile>) -> Result<&'a mut RegionFile> {
        guard
            .as_mut()
            .ok_or_else(|| RegionError::Closed(format!("region {}", self.path.display())))
    }

    fn slot(&self, region: &RegionFile, id: usize) -> Result<SectorLocation> {
        region.header.get(id).ok_or_else(|| {
            RegionError::Config(format!(
                "slot {} out of range (region has {} slots)",
                id, self.entries_per_region
            ))
        })
    }

    /// Pick the location for an entry of `size` bytes currently at `old`
    fn find_location(
        &self,
        used: &SectorBitmap,
        old: SectorLocation,
        size: usize,
    ) -> Result<SectorLocation> {
        let needed = (size as u64 + LENGTH_PREFIX_SIZE as u64).div_ceil(self.sector_size as u64);
        if needed > SectorLocation::MAX_SECTOR_COUNT as u64 || size > u32::MAX as usize {
            return Err(RegionError::EntryTooLarge {
                size,
                sectors: needed,
                max_sectors: SectorLocation::MAX_SECTOR_COUNT,
            });
        }

        if !old.is_empty() {
            let old_count = old.count() as u64;

            // Fits in what it already has
            if needed <= old_count {
                return Ok(SectorLocation::new(old.offset(), needed as u32));
            }

            // Room to grow right behind it
            if used.is_range_free(old.end(), needed - old_count) {
                return Ok(SectorLocation::new(old.offset(), needed as u32));
            }
        }

        let offset = used.find_free_run(self.header_sectors, needed);
        if offset > SectorLocation::MAX_SECTOR_OFFSET as u64 {
            return Err(RegionError::RegionFull { offset });
        }

        Ok(SectorLocation::new(offset as u32, needed as u32))
    }

    fn sector_position(&self, location: SectorLocation) -> u64 {
        location.offset() as u64 * self.sector_size as u64
    }

    fn write_location(file: &mut File, id: usize, location: SectorLocation) -> Result<()> {
        file.seek(SeekFrom::Start(HeaderTable::position_of(id)))?;
        file.write_all(&location.raw().to_be_bytes())?;
        Ok(())
    }
}

impl std::fmt::Debug for RegionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionStore")
            .field("path", &self.path)
            .field("entries_per_region", &self.entries_per_region)
            .field("sector_size", &self.sector_size)
            .finish()
    }
}
