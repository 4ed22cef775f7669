//! Nonblocking Module
//!
//! Runs engine calls on a worker pool and reports results through callbacks.
//!
//! ## Architecture
//! - Caller-owned `WorkerPool` (no hidden global pool)
//! - Every submitted call is counted while in flight
//! - `close()` blocks on that count reaching zero, then closes the engine

mod in_flight;
mod pool;
mod storage;

pub use pool::WorkerPool;
pub use storage::NonblockingStorage;
