//! Region Module
//!
//! A single region file: a header table of packed sector locations followed
//! by sector-aligned entries.
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Header Table (ceil(entries * 4 / sector_size) sectors)     │
//! │   [Location: u32 BE] × entries_per_region, in slot order   │
//! │   Location = offset (24 bits) << 8 | count (8 bits)        │
//! │   Location 0 = slot never written                          │
//! ├────────────────────────────────────────────────────────────┤
//! │ Sector Data                                                │
//! │   entry at offset * sector_size:                           │
//! │   [Length: u32 BE][Payload (Length bytes)][padding]        │
//! │   spanning count * sector_size bytes                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header sectors are never handed out to entries. Free space is tracked
//! in memory only and rebuilt from the header table when a file is opened.

mod bitmap;
mod header;
mod location;
mod store;

pub use header::HeaderTable;
pub use location::SectorLocation;
pub use store::RegionStore;

/// Size of the length prefix written in front of every entry
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of one packed location in the header table
pub const LOCATION_SIZE: usize = 4;

/// Number of header sectors needed for `entries_per_region` locations
pub(crate) fn header_sectors(entries_per_region: usize, sector_size: u32) -> u64 {
    ((entries_per_region * LOCATION_SIZE) as u64).div_ceil(sector_size as u64)
}
