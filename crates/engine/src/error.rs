// SPDX-License-Identifier: MIT

//! Errors raised by the engine crate's own boundaries (readiness probe
//! construction, the watcher). Per-service and per-component errors shared
//! with the rest of the workspace live in `fuku_core::error`.

use thiserror::Error;

/// Errors standing up or running the filesystem watcher.
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to create filesystem watcher: {0}")]
    Init(#[source] notify::Error),
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: std::path::PathBuf,
        #[source]
        source: notify::Error,
    },
}
