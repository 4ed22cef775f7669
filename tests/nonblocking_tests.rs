//! Tests for NonblockingStorage and WorkerPool
//!
//! These tests verify:
//! - Callbacks receive loaded data on worker threads
//! - close() waits for queued work and flushes it to disk
//! - Submissions after close are rejected
//! - Pool lifecycle errors
//! - close_timeout leaves the engine open when work is stuck

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use regionstore::{
    Config, Engine, EntryKey2D, EntryKey3D, NonblockingStorage, RegionError, WorkerPool,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp_dir: &TempDir, threads: usize) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .worker_threads(threads)
        .build()
}

fn setup_storage(threads: usize) -> (TempDir, NonblockingStorage, Arc<WorkerPool>) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir, threads);
    let pool = Arc::new(WorkerPool::from_config(&config).unwrap());
    let engine = Arc::new(Engine::open(config).unwrap());
    let storage = NonblockingStorage::new(engine, Arc::clone(&pool));
    (temp_dir, storage, pool)
}

// =============================================================================
// Load / Save Tests
// =============================================================================

#[test]
fn test_save_then_load_2d_single_worker() {
    let (_temp, storage, _pool) = setup_storage(1);
    let (tx, rx) = channel::unbounded();

    storage.save_2d(-3, 70, b"column".to_vec()).unwrap();
    storage
        .load_2d(-3, 70, move |result| {
            tx.send(result).unwrap();
        })
        .unwrap();

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.unwrap(), Some(b"column".to_vec()));

    storage.close().unwrap();
}

#[test]
fn test_save_then_load_3d_single_worker() {
    let (_temp, storage, _pool) = setup_storage(1);
    let (tx, rx) = channel::unbounded();

    storage.save_3d(1, -2, 3, vec![9u8; 2048]).unwrap();
    storage
        .load_3d(1, -2, 3, move |result| {
            tx.send(result).unwrap();
        })
        .unwrap();

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.unwrap(), Some(vec![9u8; 2048]));

    storage.close().unwrap();
}

#[test]
fn test_load_absent_entry_gives_none() {
    let (_temp, storage, _pool) = setup_storage(2);
    let (tx, rx) = channel::unbounded();

    storage
        .load_2d(500, 500, move |result| {
            tx.send(result).unwrap();
        })
        .unwrap();

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.unwrap(), None);

    storage.close().unwrap();
}

#[test]
fn test_callback_runs_on_worker_thread() {
    let (_temp, storage, _pool) = setup_storage(1);
    let (tx, rx) = channel::unbounded();

    storage
        .load_2d(0, 0, move |_| {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        })
        .unwrap();

    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name.as_deref(), Some("region-worker-0"));

    storage.close().unwrap();
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_flushes_queued_saves() {
    let temp_dir = TempDir::new().unwrap();

    {
        let config = test_config(&temp_dir, 4);
        let pool = Arc::new(WorkerPool::from_config(&config).unwrap());
        let engine = Arc::new(Engine::open(config).unwrap());
        let storage = NonblockingStorage::new(engine, Arc::clone(&pool));

        for x in 0..200 {
            storage.save_2d(x, x / 3, vec![x as u8; 700]).unwrap();
        }
        storage.close().unwrap();

        assert_eq!(storage.in_flight(), 0);
        pool.shutdown().unwrap();
    }

    let engine = Engine::open(test_config(&temp_dir, 1)).unwrap();
    for x in 0..200 {
        assert_eq!(
            engine.load_2d(EntryKey2D::new(x, x / 3)).unwrap(),
            Some(vec![x as u8; 700])
        );
    }
}

#[test]
fn test_submit_after_close_is_rejected() {
    let (_temp, storage, _pool) = setup_storage(1);

    storage.close().unwrap();

    assert!(matches!(
        storage.save_2d(0, 0, b"late".to_vec()),
        Err(RegionError::Closed(_))
    ));
    assert!(matches!(
        storage.load_3d(0, 0, 0, |_| {}),
        Err(RegionError::Closed(_))
    ));
    assert_eq!(storage.in_flight(), 0);
    assert!(matches!(
        storage.engine().load_3d(EntryKey3D::new(0, 0, 0)),
        Err(RegionError::Closed(_))
    ));
}

#[test]
fn test_close_timeout_keeps_engine_open() {
    let (_temp, storage, _pool) = setup_storage(1);
    let (release_tx, release_rx) = channel::bounded::<()>(1);
    let (done_tx, done_rx) = channel::bounded(1);

    storage
        .load_2d(0, 0, move |result| {
            release_rx.recv().unwrap();
            done_tx.send(result.is_ok()).unwrap();
        })
        .unwrap();

    let result = storage.close_timeout(Duration::from_millis(50));
    assert!(matches!(result, Err(RegionError::WorkerPool(_))));
    assert_eq!(storage.in_flight(), 1);

    // Engine is still usable directly
    storage
        .engine()
        .save_2d(EntryKey2D::new(1, 1), b"still open")
        .unwrap();

    release_tx.send(()).unwrap();
    assert!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap());

    storage.close().unwrap();
    assert_eq!(storage.in_flight(), 0);
}

// =============================================================================
// Worker Pool Tests
// =============================================================================

#[test]
fn test_pool_rejects_zero_threads() {
    assert!(matches!(WorkerPool::new(0), Err(RegionError::Config(_))));
}

#[test]
fn test_pool_execute_after_shutdown() {
    let pool = WorkerPool::new(2).unwrap();
    assert_eq!(pool.size(), 2);

    pool.shutdown().unwrap();
    assert!(pool.is_shut_down());

    assert!(matches!(
        pool.execute(|| {}),
        Err(RegionError::WorkerPool(_))
    ));

    // Second shutdown is a no-op
    pool.shutdown().unwrap();
}

#[test]
fn test_pool_shutdown_drains_queue() {
    let pool = WorkerPool::new(2).unwrap();
    let (tx, rx) = channel::unbounded();

    for i in 0..50 {
        let tx = tx.clone();
        pool.execute(move || tx.send(i).unwrap()).unwrap();
    }
    drop(tx);

    pool.shutdown().unwrap();

    let mut seen: Vec<i32> = rx.iter().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_pool_survives_panicking_job() {
    let pool = WorkerPool::new(1).unwrap();
    let (tx, rx) = channel::unbounded();

    pool.execute(|| panic!("job failure")).unwrap();
    pool.execute(move || tx.send("after").unwrap()).unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "after");
    pool.shutdown().unwrap();
}
