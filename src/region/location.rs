//! Packed sector location
//!
//! The only place that knows how offset and count share one `u32`.

use std::fmt;

/// Bits reserved for the sector count
const COUNT_BITS: u32 = 8;

/// Mask selecting the sector count
const COUNT_MASK: u32 = (1 << COUNT_BITS) - 1;

/// Where an entry lives: first sector and number of sectors, packed
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectorLocation(u32);

impl SectorLocation {
    /// Location of a slot that was never written
    pub const EMPTY: SectorLocation = SectorLocation(0);

    /// Largest sector count a location can hold
    pub const MAX_SECTOR_COUNT: u32 = COUNT_MASK;

    /// Largest sector offset a location can hold
    pub const MAX_SECTOR_OFFSET: u32 = u32::MAX >> COUNT_BITS;

    /// Pack an offset and count
    ///
    /// Callers check the bounds first; out-of-range bits are masked off.
    pub fn new(offset: u32, count: u32) -> Self {
        debug_assert!(offset <= Self::MAX_SECTOR_OFFSET);
        debug_assert!(count <= Self::MAX_SECTOR_COUNT);
        Self((offset << COUNT_BITS) | (count & COUNT_MASK))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// First sector of the entry
    pub fn offset(self) -> u32 {
        self.0 >> COUNT_BITS
    }

    /// Number of sectors reserved for the entry
    pub fn count(self) -> u32 {
        self.0 & COUNT_MASK
    }

    /// One past the last sector of the entry
    pub fn end(self) -> u64 {
        self.offset() as u64 + self.count() as u64
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SectorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectorLocation")
            .field("offset", &self.offset())
            .field("count", &self.count())
            .finish()
    }
}
