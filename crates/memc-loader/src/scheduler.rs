//! Bounded worker pool for per-record encode+write units
//!
//! Admission waits for a free slot before the unit is spawned, so at most
//! `max_workers` units run at once no matter how many lines a batch has.
//! [`WorkerPool::join`] is the end-of-batch barrier.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::error;

pub struct WorkerPool {
    slots: Arc<Semaphore>,
    tasks: JoinSet<()>,
    lost_units: u64,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_workers)),
            tasks: JoinSet::new(),
            lost_units: 0,
        }
    }

    /// Wait for a free slot, then run `unit` on the runtime. The slot is
    /// released when the unit finishes.
    ///
    /// Only fails if the pool's semaphore was closed, in which case `unit`
    /// is dropped without running.
    pub async fn submit<F>(&mut self, unit: F) -> Result<(), AcquireError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = self.slots.clone().acquire_owned().await?;
        self.tasks.spawn(async move {
            let _permit = permit;
            unit.await;
        });

        // Reap finished units so the set does not grow with the batch.
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                self.unit_lost(e);
            }
        }
        Ok(())
    }

    /// Wait for every submitted unit. Returns how many of them panicked or
    /// were cancelled instead of completing.
    pub async fn join(mut self) -> u64 {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                self.unit_lost(e);
            }
        }
        self.lost_units
    }

    fn unit_lost(&mut self, e: JoinError) {
        error!(error = %e, "Worker unit did not complete");
        self.lost_units += 1;
    }
}
