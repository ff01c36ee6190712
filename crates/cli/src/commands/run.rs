// SPDX-License-Identifier: MIT

//! `fuku run [PROFILE]` - the composition root: loads config, wires every
//! collaborator together, and supervises services until a signal or
//! `CmdStopAll` arrives.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use fuku_adapters::{BroadcastLogsBroadcaster, GlobMatcher, SystemProcessScanner, TracingLogger};
use fuku_core::{Config, SystemClock, WatchConfig};
use fuku_engine::{Bus, FileWatcher, Guard, Registry, Runner, WorkerPool};
use tokio_util::sync::CancellationToken;

use crate::exit_error::ExitError;
use crate::logging;

#[derive(Args)]
pub struct RunArgs {
    /// Profile to run
    #[arg(default_value = "default")]
    pub profile: String,
}

pub async fn handle(config_path: &Path, args: RunArgs) -> Result<()> {
    let config = Config::load(config_path).map_err(|e| ExitError::new(1, e.to_string()))?;
    logging::init(&config.logging);

    let config = Arc::new(config);
    let logs = BroadcastLogsBroadcaster::new(config.logs.buffer);
    let bus = Bus::new(config.logs.buffer.max(64), SystemClock, logs.clone());
    let registry = Arc::new(Registry::new());
    let guard = Arc::new(Guard::new());
    let pool = WorkerPool::new(config.concurrency.workers);

    let (watcher, mut raw_events) = FileWatcher::<GlobMatcher>::new()?;
    let watcher = Arc::new(watcher);

    let cancel = CancellationToken::new();

    tokio::spawn({
        let watcher = watcher.clone();
        async move {
            while let Some(Ok(event)) = raw_events.recv().await {
                watcher.handle_event(&event);
            }
        }
    });

    let watch_state: Arc<dyn fuku_engine::WatchState> = watcher.clone();

    tokio::spawn(fuku_engine::watcher::run_bus_loop(
        watcher,
        bus.clone(),
        config.clone(),
        make_glob_matcher,
        cancel.child_token(),
    ));

    let runner = Runner {
        config: config.clone(),
        bus,
        pool,
        registry,
        guard,
        logger: TracingLogger,
        logs,
        scanner: Box::new(SystemProcessScanner),
        watch: Some(watch_state),
    };

    let profile = args.profile.clone();
    let run_cancel = cancel.clone();
    let mut run_handle = tokio::spawn(async move { runner.run(run_cancel, &profile).await });

    let joined = tokio::select! {
        result = &mut run_handle => result,
        _ = fuku_engine::signal_future() => {
            cancel.cancel();
            run_handle.await
        }
    };

    match joined {
        Ok(result) => result.map_err(|e| ExitError::new(1, e.to_string()).into()),
        Err(e) => Err(ExitError::new(1, format!("runner task panicked: {e}")).into()),
    }
}

/// Config validation already rejects unparseable globs before a service can
/// reach `ServiceReady`, so failure here only means "config changed under
/// us since load" — fall back to matching everything rather than panicking.
fn make_glob_matcher(watch: &WatchConfig) -> GlobMatcher {
    GlobMatcher::new(&watch.include, &watch.ignore).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid watch glob pattern, watching everything");
        GlobMatcher::default()
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
