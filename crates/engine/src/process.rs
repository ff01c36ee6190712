// SPDX-License-Identifier: MIT

//! A running service's process handle: the child, its pid, and the two
//! write-once signals (`done`, `ready`) the rest of the engine waits on.

use fuku_core::ReadinessError;
use parking_lot::Mutex;
use tokio::process::Child;
use tokio::sync::{oneshot, watch};

/// Handle to one supervised child. Never reused across a restart — a fresh
/// `ProcessHandle` is built for every spawn, with a fresh `order`.
pub struct ProcessHandle {
    pid: Option<i32>,
    done_tx: Mutex<Option<watch::Sender<bool>>>,
    done_rx: watch::Receiver<bool>,
    ready_tx: Mutex<Option<oneshot::Sender<Option<ReadinessError>>>>,
    ready_rx: Mutex<Option<oneshot::Receiver<Option<ReadinessError>>>>,
    child: tokio::sync::Mutex<Child>,
}

impl ProcessHandle {
    pub fn new(child: Child) -> Self {
        let pid = child.id().map(|p| p as i32);
        let (done_tx, done_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel();
        Self {
            pid,
            done_tx: Mutex::new(Some(done_tx)),
            done_rx,
            ready_tx: Mutex::new(Some(ready_tx)),
            ready_rx: Mutex::new(Some(ready_rx)),
            child: tokio::sync::Mutex::new(child),
        }
    }

    pub fn pid(&self) -> Option<i32> {
        self.pid
    }

    /// Fulfils the readiness signal. Only the first call has any effect;
    /// later calls are silently ignored (closed exactly once).
    pub fn signal_ready(&self, err: Option<ReadinessError>) {
        if let Some(tx) = self.ready_tx.lock().take() {
            let _ = tx.send(err);
        }
    }

    /// Awaits the readiness signal. Panics if called twice (the oneshot
    /// receiver is taken on first use) — callers own exactly one wait.
    pub async fn ready(&self) -> Option<ReadinessError> {
        let rx = self.ready_rx.lock().take();
        match rx {
            Some(rx) => rx.await.unwrap_or(Some(ReadinessError::Cancelled)),
            None => Some(ReadinessError::Cancelled),
        }
    }

    /// Flips the done signal. Idempotent.
    pub fn close(&self) {
        if let Some(tx) = self.done_tx.lock().take() {
            let _ = tx.send(true);
        }
    }

    /// Awaits the done signal being flipped.
    pub async fn wait_done(&self) {
        let mut rx = self.done_rx.clone();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }

    /// Waits for the child to exit, then flips `done`. Intended to be run
    /// as a single background task per handle — `tokio::process::Child`
    /// does not support concurrent `wait()` callers, matching that.
    pub async fn run_to_completion(&self) {
        let mut child = self.child.lock().await;
        if let Err(e) = child.wait().await {
            tracing::warn!(error = %e, "child wait() failed");
        }
        drop(child);
        self.close();
    }

    /// Sends a signal-free check of whether the child has already exited,
    /// for callers that need the `tokio::process::Child` directly (e.g. to
    /// issue a kill after the process group signal failed).
    pub async fn with_child<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Child) -> R,
    {
        let mut child = self.child.lock().await;
        f(&mut child)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
