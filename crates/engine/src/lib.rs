// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![forbid(unsafe_code)]

//! fuku-engine: the process-management and orchestration machinery.
//!
//! Everything here depends on `tokio`, `nix`, `notify`, and friends to
//! actually spawn, signal, watch, and sequence real OS processes; the data
//! model and message taxonomy it operates on live in `fuku-core`.

pub mod bus;
pub mod discovery;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod preflight;
pub mod process;
pub mod readiness;
pub mod registry;
pub mod runner;
pub mod service;
pub mod watcher;
pub mod worker_pool;

pub use bus::Bus;
pub use discovery::resolve as resolve_profile;
pub use error::WatcherError;
pub use guard::{Guard, GuardHandle};
pub use lifecycle::{configure as configure_process_group, terminate};
pub use preflight::run as run_preflight;
pub use process::ProcessHandle;
pub use readiness::wait_ready;
pub use registry::{Entry, RemoveOutcome, Registry};
pub use runner::{signal_future, Runner};
pub use service::Service;
pub use watcher::{debounce::Debouncer, FileWatcher, WatchState};
pub use worker_pool::WorkerPool;
