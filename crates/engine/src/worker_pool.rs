// SPDX-License-Identifier: MIT

//! Bounds concurrent work (tier starts, watch-driven restarts, preflight
//! kills) to a fixed number of workers.

use std::sync::Arc;

use fuku_core::WorkerPoolError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// A semaphore-backed pool of `size` workers.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    /// Acquires a permit, racing against `cancel`. The permit's `Drop`
    /// releases it back to the pool — there is no explicit release call.
    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
    ) -> Result<OwnedSemaphorePermit, WorkerPoolError> {
        tokio::select! {
            permit = self.semaphore.clone().acquire_owned() => {
                permit.map_err(|_| WorkerPoolError::FailedToAcquireWorker)
            }
            _ = cancel.cancelled() => Err(WorkerPoolError::FailedToAcquireWorker),
        }
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
