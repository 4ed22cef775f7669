//! 3D keys (cubes addressed by x/y/z)

use super::{parse_axes, EntryKey, RegionKey, LOC_BITMASK, LOC_BITS};

/// Region file coordinate for 3D entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RegionKey3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl RegionKey for RegionKey3D {
    fn file_name(&self) -> String {
        format!("{}.{}.{}.3dr", self.x, self.y, self.z)
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let [x, y, z] = parse_axes::<3>(name, "3dr")?;
        Some(Self { x, y, z })
    }
}

/// Global coordinate of a 3D entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl EntryKey3D {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl EntryKey for EntryKey3D {
    type Region = RegionKey3D;

    const ENTRIES_PER_REGION: usize = 1 << (LOC_BITS * 3);

    fn region_key(&self) -> RegionKey3D {
        RegionKey3D::new(
            self.x >> LOC_BITS,
            self.y >> LOC_BITS,
            self.z >> LOC_BITS,
        )
    }

    fn id(&self) -> usize {
        (((self.x & LOC_BITMASK) << (LOC_BITS * 2))
            | ((self.y & LOC_BITMASK) << LOC_BITS)
            | (self.z & LOC_BITMASK)) as usize
    }

    fn from_region(region: RegionKey3D, id: usize) -> Self {
        let id = id as i32;
        Self {
            x: (region.x << LOC_BITS) | ((id >> (LOC_BITS * 2)) & LOC_BITMASK),
            y: (region.y << LOC_BITS) | ((id >> LOC_BITS) & LOC_BITMASK),
            z: (region.z << LOC_BITS) | (id & LOC_BITMASK),
        }
    }
}
