// SPDX-License-Identifier: MIT

//! Tracks every running or detaching service process and provides the
//! shutdown wait-group.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::process::ProcessHandle;

/// One tracked process. Identity for removal purposes is `Arc::ptr_eq` on
/// `proc`, not `name` — a restart can have an old and new handle for the
/// same name briefly coexist in `active`/`detached`.
#[derive(Clone)]
pub struct Entry {
    pub proc: Arc<ProcessHandle>,
    pub tier: String,
    pub order: u64,
}

/// Outcome of [`Registry::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: bool,
    pub tier: Option<String>,
    /// True iff the match was found in `active` (i.e. nobody called
    /// `detach` first) — an unsupervised exit.
    pub unexpected_exit: bool,
}

struct Inner {
    active: HashMap<String, Entry>,
    detached: HashMap<String, Entry>,
}

/// Registry of in-flight service processes.
pub struct Registry {
    inner: Mutex<Inner>,
    next_order: AtomicU64,
    pending: AtomicU64,
    drained: Notify,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                active: HashMap::new(),
                detached: HashMap::new(),
            }),
            next_order: AtomicU64::new(0),
            pending: AtomicU64::new(0),
            drained: Notify::new(),
        }
    }

    /// Registers a freshly started process, replacing any stale `detached`
    /// entry under the same name.
    pub fn add(&self, name: &str, proc: Arc<ProcessHandle>, tier: &str) {
        let order = self.next_order.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock();
        inner.detached.remove(name);
        inner.active.insert(
            name.to_string(),
            Entry {
                proc,
                tier: tier.to_string(),
                order,
            },
        );
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves `name` from `active` to `detached`. No-op if `name` is absent
    /// or already detached.
    pub fn detach(&self, name: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.active.remove(name) {
            inner.detached.insert(name.to_string(), entry);
        }
    }

    /// Removes `name` if `proc` matches by pointer identity, checking
    /// `detached` before `active`.
    pub fn remove(&self, name: &str, proc: &Arc<ProcessHandle>) -> RemoveOutcome {
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.detached.get(name) {
            if Arc::ptr_eq(&entry.proc, proc) {
                let tier = inner.detached.remove(name).map(|e| e.tier);
                drop(inner);
                self.mark_done();
                return RemoveOutcome {
                    removed: true,
                    tier,
                    unexpected_exit: false,
                };
            }
        }

        if let Some(entry) = inner.active.get(name) {
            if Arc::ptr_eq(&entry.proc, proc) {
                let tier = inner.active.remove(name).map(|e| e.tier);
                drop(inner);
                self.mark_done();
                return RemoveOutcome {
                    removed: true,
                    tier,
                    unexpected_exit: true,
                };
            }
        }

        RemoveOutcome {
            removed: false,
            tier: None,
            unexpected_exit: false,
        }
    }

    fn mark_done(&self) {
        let remaining = self.pending.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            self.drained.notify_waiters();
        }
    }

    /// Looks up the current entry for `name` across both maps, preferring
    /// `active`.
    pub fn get(&self, name: &str) -> Option<Entry> {
        let inner = self.inner.lock();
        inner
            .active
            .get(name)
            .or_else(|| inner.detached.get(name))
            .cloned()
    }

    /// Snapshot of every tracked process, newest-started first.
    pub fn snapshot_reverse(&self) -> Vec<(String, Entry)> {
        let inner = self.inner.lock();
        let mut all: Vec<(String, Entry)> = inner
            .active
            .iter()
            .chain(inner.detached.iter())
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();
        all.sort_by(|a, b| b.1.order.cmp(&a.1.order));
        all
    }

    /// Awaits every tracked process being removed, bounded by `timeout`.
    pub async fn wait(&self, timeout: Duration) {
        // Register interest before re-checking the count, so a `mark_done`
        // that lands between the check and the await can't be missed.
        let notified = self.drained.notified();
        if self.pending.load(Ordering::SeqCst) == 0 {
            return;
        }
        if tokio::time::timeout(timeout, notified).await.is_err() {
            tracing::warn!("registry wait timed out with processes still pending");
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
