//! 2D keys (columns addressed by x/z)

use super::{parse_axes, EntryKey, RegionKey, LOC_BITMASK, LOC_BITS};

/// Region file coordinate for 2D entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey2D {
    pub x: i32,
    pub z: i32,
}

impl RegionKey2D {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl RegionKey for RegionKey2D {
    fn file_name(&self) -> String {
        format!("{}.{}.2dr", self.x, self.z)
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let [x, z] = parse_axes::<2>(name, "2dr")?;
        Some(Self { x, z })
    }
}

/// Global coordinate of a 2D entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey2D {
    pub x: i32,
    pub z: i32,
}

impl EntryKey2D {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl EntryKey for EntryKey2D {
    type Region = RegionKey2D;

    const ENTRIES_PER_REGION: usize = 1 << (LOC_BITS * 2);

    fn region_key(&self) -> RegionKey2D {
        RegionKey2D::new(self.x >> LOC_BITS, self.z >> LOC_BITS)
    }

    fn id(&self) -> usize {
        (((self.x & LOC_BITMASK) << LOC_BITS) | (self.z & LOC_BITMASK)) as usize
    }

    fn from_region(region: RegionKey2D, id: usize) -> Self {
        let id = id as i32;
        Self {
            x: (region.x << LOC_BITS) | ((id >> LOC_BITS) & LOC_BITMASK),
            z: (region.z << LOC_BITS) | (id & LOC_BITMASK),
        }
    }
}
