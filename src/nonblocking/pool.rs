//! Worker Pool
//!
//! Fixed set of named threads pulling jobs off a crossbeam channel.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{RegionError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Thread pool that runs storage jobs
///
/// Owned explicitly by whoever creates it and shared by `Arc`. Nothing
/// starts a pool behind the caller's back, and nothing outlives `shutdown`.
pub struct WorkerPool {
    /// Job queue (`None` once shut down)
    sender: Mutex<Option<Sender<Job>>>,

    /// Worker threads still to be joined
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Number of threads started
    size: usize,
}

impl WorkerPool {
    /// Start a pool with `threads` workers
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(RegionError::Config(
                "worker pool needs at least 1 thread".to_string(),
            ));
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);

        for worker_id in 0..threads {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("region-worker-{}", worker_id))
                .spawn(move || {
                    // Ends once every sender is gone and the queue is drained
                    for job in receiver.iter() {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            tracing::error!("Job panicked on worker {}", worker_id);
                        }
                    }
                    tracing::debug!("Worker {} stopped", worker_id);
                })?;
            workers.push(handle);
        }

        tracing::debug!("Started worker pool with {} threads", threads);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            size: threads,
        })
    }

    /// Start a pool sized by `config.worker_threads`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.worker_threads)
    }

    /// Queue a job
    ///
    /// Fails once the pool is shut down; the job is dropped without running.
    pub fn execute<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender
                .send(Box::new(job))
                .map_err(|_| RegionError::WorkerPool("job queue disconnected".to_string())),
            None => Err(RegionError::WorkerPool("pool is shut down".to_string())),
        }
    }

    /// Stop accepting jobs, finish the queued ones and join every worker
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&self) -> Result<()> {
        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        let mut panicked = 0;

        for handle in workers {
            // A job dropping the last handle to the pool must not join itself
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                panicked += 1;
            }
        }

        if panicked > 0 {
            return Err(RegionError::WorkerPool(format!(
                "{} worker threads panicked",
                panicked
            )));
        }
        Ok(())
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("Worker pool shutdown failed: {}", e);
        }
    }
}
