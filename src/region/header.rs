//! Header table
//!
//! In-memory mirror of the location table at the start of a region file.

use super::{SectorLocation, LOCATION_SIZE};

/// Slot id → packed location, as stored at the start of the file
#[derive(Debug, Clone)]
pub struct HeaderTable {
    locations: Vec<SectorLocation>,
}

impl HeaderTable {
    /// Decode `entries_per_region` big-endian locations
    ///
    /// Missing trailing bytes decode as empty slots.
    pub fn from_bytes(bytes: &[u8], entries_per_region: usize) -> Self {
        let mut locations = vec![SectorLocation::EMPTY; entries_per_region];
        for (slot, chunk) in locations
            .iter_mut()
            .zip(bytes.chunks_exact(LOCATION_SIZE))
        {
            let raw = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            *slot = SectorLocation::from_raw(raw);
        }
        Self { locations }
    }

    /// Size of the encoded table in bytes
    pub fn byte_len(entries_per_region: usize) -> u64 {
        (entries_per_region * LOCATION_SIZE) as u64
    }

    /// File position of the location for `id`
    pub fn position_of(id: usize) -> u64 {
        (id * LOCATION_SIZE) as u64
    }

    /// Location for `id`, `None` if the id is outside the table
    pub fn get(&self, id: usize) -> Option<SectorLocation> {
        self.locations.get(id).copied()
    }

    pub(crate) fn set(&mut self, id: usize, location: SectorLocation) {
        self.locations[id] = location;
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Iterate over written slots as `(id, location)`
    pub fn allocated(&self) -> impl Iterator<Item = (usize, SectorLocation)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, location)| !location.is_empty())
            .map(|(id, location)| (id, *location))
    }
}
