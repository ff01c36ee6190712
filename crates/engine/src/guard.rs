// SPDX-License-Identifier: MIT

//! Per-service restart guard: prevents two concurrent `Service::restart`
//! calls for the same service from racing each other.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Non-blocking named lock. Used exclusively by `Service::restart`.
#[derive(Default)]
pub struct Guard {
    held: Mutex<HashSet<String>>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to acquire the lock for `name`. Returns `true` if this call
    /// newly acquired it, `false` if it was already held.
    pub fn try_lock(&self, name: &str) -> bool {
        self.held.lock().insert(name.to_string())
    }

    /// Releases the lock for `name`. No-op if not held.
    pub fn unlock(&self, name: &str) {
        self.held.lock().remove(name);
    }
}

/// RAII guard that unlocks on drop, so `Service::restart` releases the lock
/// on every return path (success, early-return, or panic unwind) without
/// repeating `unlock` at each exit point.
pub struct GuardHandle<'a> {
    guard: &'a Guard,
    name: String,
}

impl<'a> GuardHandle<'a> {
    pub fn new(guard: &'a Guard, name: String) -> Self {
        Self { guard, name }
    }
}

impl Drop for GuardHandle<'_> {
    fn drop(&mut self) {
        self.guard.unlock(&self.name);
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
