// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fuku-adapters: narrow capability traits for the collaborators the
//! orchestration core treats as opaque — logging, the per-service log-line
//! broadcast, glob matching for the watcher, and host process enumeration
//! for preflight. Each trait has a real implementation and, behind
//! `test-support`, a fake for driving the engine in unit tests.

pub mod logger;
pub mod logs_broadcaster;
pub mod matcher;
pub mod process_scanner;

pub use logger::{Logger, TracingLogger};
pub use logs_broadcaster::{BroadcastLogsBroadcaster, LogsBroadcaster, NoopLogsBroadcaster};
pub use matcher::{GlobMatcher, Matcher};
pub use process_scanner::{HostProcess, ProcessScanner, SystemProcessScanner};

#[cfg(any(test, feature = "test-support"))]
pub use logger::FakeLogger;
#[cfg(any(test, feature = "test-support"))]
pub use logs_broadcaster::FakeLogsBroadcaster;
#[cfg(any(test, feature = "test-support"))]
pub use process_scanner::FakeProcessScanner;
