// SPDX-License-Identifier: MIT

//! The `Logger` the distilled spec treats as an opaque collaborator.
//! The real implementation forwards to `tracing`; a fake records calls for
//! assertions in engine unit tests.

/// Structured logger the supervisor writes its own operational log through.
/// Distinct from [`crate::LogsBroadcaster`], which carries per-service child
/// process output.
pub trait Logger: Clone + Send + Sync + 'static {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Forwards to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Logger;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Warn,
        Error,
        Debug,
    }

    /// Records every call for assertions.
    #[derive(Debug, Clone, Default)]
    pub struct FakeLogger {
        calls: Arc<Mutex<Vec<(Level, String)>>>,
    }

    impl FakeLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<(Level, String)> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }
    }

    impl Logger for FakeLogger {
        fn info(&self, message: &str) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((Level::Info, message.to_string()));
        }

        fn warn(&self, message: &str) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((Level::Warn, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((Level::Error, message.to_string()));
        }

        fn debug(&self, message: &str) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((Level::Debug, message.to_string()));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLogger, Level};

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
