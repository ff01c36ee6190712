// SPDX-License-Identifier: MIT

//! `LogsBroadcaster`: the per-service log-line stream the distilled spec
//! marks out of scope beyond its interface. The real implementation fans
//! lines out over an in-process `tokio::sync::broadcast` channel — enough
//! for a TUI/CLI front-end to tail lines without us inventing the embedded
//! socket server the spec explicitly excludes.

use tokio::sync::broadcast;

/// Receives `(service, line)` pairs for every line a supervised child (or
/// the supervisor itself, under the pinned name `"supervisor"`) writes.
pub trait LogsBroadcaster: Clone + Send + Sync + 'static {
    fn broadcast(&self, service: &str, line: &str);
}

/// Fans lines out to any number of subscribers via a broadcast channel.
/// Lines published with no subscribers are simply dropped (broadcast
/// channels have no backlog when nobody is listening).
#[derive(Clone)]
pub struct BroadcastLogsBroadcaster {
    tx: broadcast::Sender<(String, String)>,
}

impl BroadcastLogsBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(String, String)> {
        self.tx.subscribe()
    }
}

impl LogsBroadcaster for BroadcastLogsBroadcaster {
    fn broadcast(&self, service: &str, line: &str) {
        // No subscribers is the common case before a TUI attaches; a send
        // error here just means nobody is listening right now.
        let _ = self.tx.send((service.to_string(), line.to_string()));
    }
}

/// Discards every line. Used when no log consumer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogsBroadcaster;

impl LogsBroadcaster for NoopLogsBroadcaster {
    fn broadcast(&self, _service: &str, _line: &str) {}
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::LogsBroadcaster;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    pub struct FakeLogsBroadcaster {
        lines: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl FakeLogsBroadcaster {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<(String, String)> {
            self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }
    }

    impl LogsBroadcaster for FakeLogsBroadcaster {
        fn broadcast(&self, service: &str, line: &str) {
            self.lines
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((service.to_string(), line.to_string()));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLogsBroadcaster;

#[cfg(test)]
#[path = "logs_broadcaster_tests.rs"]
mod tests;
