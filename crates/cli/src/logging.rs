// SPDX-License-Identifier: MIT

//! Wires `fuku.yaml`'s `logging` section into a `tracing-subscriber`
//! registry writing to stderr, so child stdout/stderr tees stay readable
//! on stdout while the supervisor's own structured log goes to stderr.

use fuku_core::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global `tracing` subscriber. `RUST_LOG` always wins over
/// `logging.level` when set, matching the teacher's daemon setup.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .init();
    }
}
