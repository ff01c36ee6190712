// SPDX-License-Identifier: MIT

//! Coalesces a burst of filesystem events for one service into a single
//! `WatchTriggered` after a quiet period.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Accumulates unique changed paths and fires once, `debounce` after the
/// last `trigger` call, via `fire_tx`.
pub struct Debouncer {
    pending: Arc<Mutex<HashSet<PathBuf>>>,
    armed: Arc<AtomicBool>,
    debounce: Duration,
    fire_tx: mpsc::Sender<Vec<PathBuf>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(debounce: Duration, fire_tx: mpsc::Sender<Vec<PathBuf>>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashSet::new())),
            armed: Arc::new(AtomicBool::new(true)),
            debounce,
            fire_tx,
            timer: Mutex::new(None),
        }
    }

    /// Records a changed path and (re)starts the quiet-period timer.
    /// Ignored once `stop` has been called.
    pub fn trigger(&self, path: PathBuf) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        self.pending.lock().insert(path);

        if let Some(old) = self.timer.lock().take() {
            old.abort();
        }

        let pending = self.pending.clone();
        let fire_tx = self.fire_tx.clone();
        let debounce = self.debounce;
        let armed = self.armed.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !armed.load(Ordering::Acquire) {
                return;
            }
            let changed: Vec<PathBuf> = pending.lock().drain().collect();
            if !changed.is_empty() {
                let _ = fire_tx.send(changed).await;
            }
        });
        *self.timer.lock() = Some(handle);
    }

    /// Cancels any pending timer and stops accepting further triggers.
    pub fn stop(&self) {
        self.armed.store(false, Ordering::Release);
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
        self.pending.lock().clear();
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
