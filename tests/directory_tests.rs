//! Tests for RegionDirectory
//!
//! These tests verify:
//! - Routing keys to region files
//! - Lazy creation of region files (never on load)
//! - One shared store per region
//! - Region discovery from file names
//! - Close semantics

use std::fs;
use std::sync::Arc;
use std::thread;

use regionstore::{
    EntryKey2D, EntryKey3D, RegionDirectory, RegionError, RegionKey2D, RegionKey3D, SyncStrategy,
};
use tempfile::TempDir;

const SECTOR_SIZE: u32 = 512;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_directory_2d() -> (TempDir, RegionDirectory<EntryKey2D>) {
    let temp_dir = TempDir::new().unwrap();
    let directory =
        RegionDirectory::open(temp_dir.path(), SECTOR_SIZE, SyncStrategy::OsBuffered).unwrap();
    (temp_dir, directory)
}

// =============================================================================
// Routing Tests
// =============================================================================

#[test]
fn test_open_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("region2d");

    assert!(!path.exists());

    let _directory: RegionDirectory<EntryKey2D> =
        RegionDirectory::open(&path, SECTOR_SIZE, SyncStrategy::OsBuffered).unwrap();

    assert!(path.is_dir());
}

#[test]
fn test_save_load_across_regions() {
    let (temp, directory) = setup_temp_directory_2d();

    directory.save(&EntryKey2D::new(5, 0), b"origin").unwrap();
    directory.save(&EntryKey2D::new(32, 0), b"east").unwrap();
    directory.save(&EntryKey2D::new(-1, 0), b"west").unwrap();

    assert_eq!(
        directory.load(&EntryKey2D::new(5, 0)).unwrap(),
        Some(b"origin".to_vec())
    );
    assert_eq!(
        directory.load(&EntryKey2D::new(32, 0)).unwrap(),
        Some(b"east".to_vec())
    );
    assert_eq!(
        directory.load(&EntryKey2D::new(-1, 0)).unwrap(),
        Some(b"west".to_vec())
    );

    assert!(temp.path().join("0.0.2dr").is_file());
    assert!(temp.path().join("1.0.2dr").is_file());
    assert!(temp.path().join("-1.0.2dr").is_file());
    assert_eq!(directory.open_region_count(), 3);
}

#[test]
fn test_load_missing_region_does_not_create_file() {
    let (temp, directory) = setup_temp_directory_2d();

    assert_eq!(directory.load(&EntryKey2D::new(1000, 1000)).unwrap(), None);
    directory.remove(&EntryKey2D::new(1000, 1000)).unwrap();

    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    assert_eq!(directory.open_region_count(), 0);
}

#[test]
fn test_load_absent_entry_in_existing_region() {
    let (_temp, directory) = setup_temp_directory_2d();

    directory.save(&EntryKey2D::new(0, 0), b"here").unwrap();

    assert_eq!(directory.load(&EntryKey2D::new(0, 1)).unwrap(), None);
}

#[test]
fn test_remove_entry() {
    let (_temp, directory) = setup_temp_directory_2d();
    let key = EntryKey2D::new(-40, 17);

    directory.save(&key, b"gone soon").unwrap();
    directory.remove(&key).unwrap();

    assert_eq!(directory.load(&key).unwrap(), None);
}

#[test]
fn test_store_shared_per_region() {
    let (_temp, directory) = setup_temp_directory_2d();

    let a = directory.store_for(RegionKey2D::new(2, 3)).unwrap();
    let b = directory.store_for(RegionKey2D::new(2, 3)).unwrap();
    let c = directory.store_for(RegionKey2D::new(3, 2)).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn test_3d_directory() {
    let temp_dir = TempDir::new().unwrap();
    let directory: RegionDirectory<EntryKey3D> =
        RegionDirectory::open(temp_dir.path(), SECTOR_SIZE, SyncStrategy::OsBuffered).unwrap();

    directory.save(&EntryKey3D::new(1, -1, 40), b"cube").unwrap();

    assert_eq!(
        directory.load(&EntryKey3D::new(1, -1, 40)).unwrap(),
        Some(b"cube".to_vec())
    );
    assert!(temp_dir.path().join("0.-1.1.3dr").is_file());

    let store = directory.store_for(RegionKey3D::new(0, -1, 1)).unwrap();
    assert_eq!(store.entries_per_region(), 32768);
}

// =============================================================================
// Discovery Tests
// =============================================================================

#[test]
fn test_regions_lists_region_files() {
    let (temp, directory) = setup_temp_directory_2d();

    directory.save(&EntryKey2D::new(100, 0), b"a").unwrap();
    directory.save(&EntryKey2D::new(-100, 0), b"b").unwrap();
    directory.save(&EntryKey2D::new(0, 0), b"c").unwrap();
    fs::write(temp.path().join("README.txt"), b"not a region").unwrap();
    fs::write(temp.path().join("0.0.0.3dr"), b"wrong dimension").unwrap();

    let regions = directory.regions().unwrap();

    assert_eq!(
        regions,
        vec![
            RegionKey2D::new(-4, 0),
            RegionKey2D::new(0, 0),
            RegionKey2D::new(3, 0),
        ]
    );
}

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let directory: RegionDirectory<EntryKey2D> =
            RegionDirectory::open(temp_dir.path(), SECTOR_SIZE, SyncStrategy::OsBuffered)
                .unwrap();
        for x in 0..40 {
            directory
                .save(&EntryKey2D::new(x, -x), &vec![x as u8; 100 + x as usize])
                .unwrap();
        }
        directory.close().unwrap();
    }

    let directory: RegionDirectory<EntryKey2D> =
        RegionDirectory::open(temp_dir.path(), SECTOR_SIZE, SyncStrategy::OsBuffered).unwrap();
    for x in 0..40 {
        assert_eq!(
            directory.load(&EntryKey2D::new(x, -x)).unwrap(),
            Some(vec![x as u8; 100 + x as usize])
        );
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_rejects_further_operations() {
    let (_temp, directory) = setup_temp_directory_2d();

    directory.save(&EntryKey2D::new(0, 0), b"x").unwrap();
    let store = directory.store_for(RegionKey2D::new(0, 0)).unwrap();

    directory.close().unwrap();

    assert!(store.is_closed());
    assert_eq!(directory.open_region_count(), 0);
    assert!(matches!(
        directory.save(&EntryKey2D::new(0, 0), b"y"),
        Err(RegionError::Closed(_))
    ));
    assert!(matches!(
        directory.load(&EntryKey2D::new(0, 0)),
        Err(RegionError::Closed(_))
    ));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_saves_many_regions() {
    let (_temp, directory) = setup_temp_directory_2d();
    let directory = Arc::new(directory);

    let handles: Vec<_> = (0..8i32)
        .map(|t| {
            let directory = Arc::clone(&directory);
            thread::spawn(move || {
                for i in 0..64i32 {
                    // Spread across regions and share some between threads
                    let key = EntryKey2D::new(i * 7, t * 13 - 40);
                    directory.save(&key, format!("{}:{}", t, i).as_bytes()).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..8i32 {
        for i in 0..64i32 {
            let key = EntryKey2D::new(i * 7, t * 13 - 40);
            assert_eq!(
                directory.load(&key).unwrap(),
                Some(format!("{}:{}", t, i).into_bytes())
            );
        }
    }
}
