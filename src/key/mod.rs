//! Key Module
//!
//! Maps global entry coordinates onto region files and header slots.
//!
//! ## Addressing
//! Each axis of a global coordinate is split at `LOC_BITS`:
//! ```text
//!   axis value:  [ high bits ........ | low LOC_BITS ]
//!                  └─ region coordinate  └─ local position
//! ```
//! - Region coordinate: arithmetic right shift (rounds toward -∞)
//! - Slot id: local positions of all axes concatenated, first axis most
//!   significant, giving `2^(LOC_BITS * axes)` slots per region

mod cubic;
mod flat;

use std::fmt::Debug;
use std::hash::Hash;

pub use cubic::{EntryKey3D, RegionKey3D};
pub use flat::{EntryKey2D, RegionKey2D};

/// Bits of each axis that address a position inside one region
pub const LOC_BITS: u32 = 5;

/// Mask selecting the local part of an axis
pub(crate) const LOC_BITMASK: i32 = (1 << LOC_BITS) - 1;

/// Coordinate of one backing region file
pub trait RegionKey: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Name of the file backing this region
    fn file_name(&self) -> String;

    /// Parse a region key from a file name produced by [`file_name`](Self::file_name)
    fn from_file_name(name: &str) -> Option<Self>;
}

/// Coordinate of one stored entry
pub trait EntryKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Region coordinate type for this dimensionality
    type Region: RegionKey;

    /// Number of header slots in every region of this dimensionality
    const ENTRIES_PER_REGION: usize;

    /// Region containing this entry
    fn region_key(&self) -> Self::Region;

    /// Slot id of this entry inside its region, in `0..ENTRIES_PER_REGION`
    fn id(&self) -> usize;

    /// Rebuild the global coordinate from a region and a slot id
    fn from_region(region: Self::Region, id: usize) -> Self;
}

/// Parse `"{a}.{b}...{suffix}"` into exactly `N` integer axes
pub(crate) fn parse_axes<const N: usize>(name: &str, suffix: &str) -> Option<[i32; N]> {
    let mut parts = name.split('.');
    let mut axes = [0i32; N];
    for axis in axes.iter_mut() {
        *axis = parts.next()?.parse().ok()?;
    }
    if parts.next()? != suffix || parts.next().is_some() {
        return None;
    }
    Some(axes)
}
