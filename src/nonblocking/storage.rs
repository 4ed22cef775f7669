//! Nonblocking Storage
//!
//! Callback-based front end over a shared `Engine`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{RegionError, Result};
use crate::key::{EntryKey2D, EntryKey3D};

use super::in_flight::{InFlight, InFlightGuard};
use super::WorkerPool;

/// Dispatches saves and loads onto a worker pool
///
/// Loads hand their result to a callback on a worker thread. A failed load
/// is logged and the error is passed to the callback as well. Saves have no
/// callback; failures are logged.
pub struct NonblockingStorage {
    engine: Arc<Engine>,
    pool: Arc<WorkerPool>,
    in_flight: Arc<InFlight>,
    closed: AtomicBool,
}

impl NonblockingStorage {
    /// Wrap an engine; jobs run on `pool`, which the caller keeps owning
    pub fn new(engine: Arc<Engine>, pool: Arc<WorkerPool>) -> Self {
        Self {
            engine,
            pool,
            in_flight: InFlight::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Load a 2D entry; `callback` runs on a worker thread
    pub fn load_2d<F>(&self, x: i32, z: i32, callback: F) -> Result<()>
    where
        F: FnOnce(Result<Option<Vec<u8>>>) + Send + 'static,
    {
        let key = EntryKey2D::new(x, z);
        self.submit(move |engine| {
            let result = engine.load_2d(key);
            if let Err(e) = &result {
                tracing::warn!("Failed to load 2D entry {:?}: {}", key, e);
            }
            callback(result);
        })
    }

    /// Load a 3D entry; `callback` runs on a worker thread
    pub fn load_3d<F>(&self, x: i32, y: i32, z: i32, callback: F) -> Result<()>
    where
        F: FnOnce(Result<Option<Vec<u8>>>) + Send + 'static,
    {
        let key = EntryKey3D::new(x, y, z);
        self.submit(move |engine| {
            let result = engine.load_3d(key);
            if let Err(e) = &result {
                tracing::warn!("Failed to load 3D entry {:?}: {}", key, e);
            }
            callback(result);
        })
    }

    /// Save a 2D entry in the background
    pub fn save_2d(&self, x: i32, z: i32, data: Vec<u8>) -> Result<()> {
        let key = EntryKey2D::new(x, z);
        self.submit(move |engine| {
            if let Err(e) = engine.save_2d(key, &data) {
                tracing::error!("Failed to save 2D entry {:?}: {}", key, e);
            }
        })
    }

    /// Save a 3D entry in the background
    pub fn save_3d(&self, x: i32, y: i32, z: i32, data: Vec<u8>) -> Result<()> {
        let key = EntryKey3D::new(x, y, z);
        self.submit(move |engine| {
            if let Err(e) = engine.save_3d(key, &data) {
                tracing::error!("Failed to save 3D entry {:?}: {}", key, e);
            }
        })
    }

    /// Wait for all submitted work, then close the engine
    ///
    /// Uses the engine's `shutdown_timeout_ms` (0 waits forever). On timeout
    /// the engine is left open and an error is returned.
    pub fn close(&self) -> Result<()> {
        match self.engine.config().shutdown_timeout_ms {
            0 => self.close_inner(None),
            ms => self.close_inner(Some(Duration::from_millis(ms))),
        }
    }

    /// Like [`close`](Self::close) with an explicit timeout
    pub fn close_timeout(&self, timeout: Duration) -> Result<()> {
        self.close_inner(Some(timeout))
    }

    /// Number of submitted operations that have not finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    /// Get the wrapped engine
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce(&Engine) + Send + 'static,
    {
        // Count first so a concurrent close() either waits for us or we see it
        let guard: InFlightGuard = self.in_flight.begin();
        if self.closed.load(Ordering::SeqCst) {
            return Err(RegionError::Closed("nonblocking storage".to_string()));
        }

        let engine = Arc::clone(&self.engine);
        self.pool.execute(move || {
            let _guard = guard;
            job(&engine);
        })
    }

    fn close_inner(&self, timeout: Option<Duration>) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);

        match timeout {
            None => self.in_flight.wait_idle(),
            Some(timeout) => {
                if !self.in_flight.wait_idle_for(timeout) {
                    return Err(RegionError::WorkerPool(format!(
                        "timed out after {:?} with {} operations in flight",
                        timeout,
                        self.in_flight.count()
                    )));
                }
            }
        }

        self.engine.close()
    }
}
