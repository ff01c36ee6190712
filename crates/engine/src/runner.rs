// SPDX-License-Identifier: MIT

//! Top-level orchestration: resolves a profile, runs preflight, starts
//! every tier, then serves restart/stop commands until asked to shut down.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fuku_adapters::{Logger, LogsBroadcaster, ProcessScanner};
use fuku_core::{Clock, Config, MessageData, Phase, RunnerError};
use tokio_util::sync::CancellationToken;

use crate::bus::Bus;
use crate::discovery;
use crate::guard::Guard;
use crate::preflight;
use crate::registry::Registry;
use crate::service::Service;
use crate::watcher::WatchState;
use crate::worker_pool::WorkerPool;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const PREFLIGHT_KILL_TIMEOUT: Duration = Duration::from_secs(3);

/// Everything `run` needs, bundled to keep the function signature readable.
pub struct Runner<C, L, B> {
    pub config: Arc<Config>,
    pub bus: Bus<C, B>,
    pub pool: WorkerPool,
    pub registry: Arc<Registry>,
    pub guard: Arc<Guard>,
    pub logger: L,
    pub logs: B,
    pub scanner: Box<dyn ProcessScanner>,
    /// `None` when no filesystem watcher is wired up (e.g. unit tests).
    pub watch: Option<Arc<dyn WatchState>>,
}

impl<C, L, B> Runner<C, L, B>
where
    C: Clock + Clone,
    L: Logger,
    B: LogsBroadcaster,
{
    /// Runs the full supervisor lifecycle for `profile` until `cancel`
    /// fires or a `CmdStopAll` is received.
    pub async fn run(&self, cancel: CancellationToken, profile: &str) -> Result<(), RunnerError> {
        self.bus.publish(MessageData::PhaseChanged {
            phase: Phase::Startup,
        });

        let tiers = discovery::resolve(&self.config, profile)?;
        self.bus.publish(MessageData::ProfileResolved {
            profile: profile.to_string(),
            tiers: tiers.iter().map(|t| t.name.clone()).collect(),
        });

        if tiers.iter().all(|t| t.services.is_empty()) {
            self.bus.publish(MessageData::PhaseChanged {
                phase: Phase::Stopped,
            });
            return Ok(());
        }

        let service_dirs: HashMap<String, std::path::PathBuf> = tiers
            .iter()
            .flat_map(|t| t.services.iter())
            .filter_map(|name| {
                self.config
                    .services
                    .get(name)
                    .map(|c| (name.clone(), c.dir.clone()))
            })
            .collect();
        preflight::run(
            self.scanner.as_ref(),
            &service_dirs,
            &self.bus,
            &self.pool,
            &cancel,
            PREFLIGHT_KILL_TIMEOUT,
        )
        .await;

        let service = Arc::new(Service::new(
            self.config.clone(),
            self.registry.clone(),
            self.bus.clone(),
            self.guard.clone(),
            self.logger.clone(),
            self.logs.clone(),
            self.watch.clone(),
        ));

        let startup_cancel = cancel.child_token();
        let mut rx = self.bus.subscribe(cancel.child_token());

        let startup = {
            let service = service.clone();
            let bus = self.bus.clone();
            let pool = self.pool.clone();
            let tiers = tiers.clone();
            let cancel = startup_cancel.clone();
            tokio::spawn(async move {
                for tier in &tiers {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    bus.publish(MessageData::TierStarting {
                        tier: tier.name.clone(),
                        services: tier.services.clone(),
                    });

                    let mut join_set = tokio::task::JoinSet::new();
                    for name in &tier.services {
                        let Ok(permit) = pool.acquire(&cancel).await else {
                            return false;
                        };
                        let service = service.clone();
                        let name = name.clone();
                        let tier_name = tier.name.clone();
                        let cancel = cancel.clone();
                        join_set.spawn(async move {
                            let _permit = permit;
                            service.start(&cancel, &name, &tier_name).await
                        });
                    }
                    let mut any_failed = false;
                    while let Some(result) = join_set.join_next().await {
                        if !matches!(result, Ok(Ok(()))) {
                            any_failed = true;
                        }
                    }
                    if !any_failed {
                        bus.publish(MessageData::TierReady {
                            tier: tier.name.clone(),
                        });
                    }
                }
                true
            })
        };

        tokio::select! {
            _ = startup => {}
            _ = cancel.cancelled() => {
                startup_cancel.cancel();
            }
        }

        self.bus.publish(MessageData::PhaseChanged {
            phase: Phase::Running,
        });

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if self.handle_message(&service, &cancel, &msg.data).await {
                        break;
                    }
                }
            }
        }

        self.bus.publish(MessageData::PhaseChanged {
            phase: Phase::Stopping,
        });

        let snapshot = self.registry.snapshot_reverse();
        for (name, _entry) in &snapshot {
            self.registry.detach(name);
        }
        for (name, _entry) in &snapshot {
            service.stop(name).await;
        }
        self.registry.wait(SHUTDOWN_TIMEOUT).await;

        self.bus.publish(MessageData::PhaseChanged {
            phase: Phase::Stopped,
        });

        Ok(())
    }

    /// Returns `true` if the running phase should end.
    async fn handle_message(
        &self,
        service: &Arc<Service<C, L, B>>,
        cancel: &CancellationToken,
        data: &MessageData,
    ) -> bool {
        match data {
            MessageData::WatchTriggered { service: name, .. } => {
                let service = service.clone();
                let name = name.clone();
                let cancel = cancel.clone();
                let pool = self.pool.clone();
                tokio::spawn(async move {
                    let Ok(permit) = pool.acquire(&cancel).await else {
                        return;
                    };
                    let _permit = permit;
                    service.restart(&cancel, &name).await;
                });
                false
            }
            MessageData::CmdStopService { service: name } => {
                service.stop(name).await;
                false
            }
            MessageData::CmdRestartService { service: name } => {
                service.restart(cancel, name).await;
                false
            }
            MessageData::CmdStopAll => true,
            _ => false,
        }
    }
}

/// Resolves when a Unix SIGINT or SIGTERM arrives. Falls back to pending
/// forever if the signal handlers fail to install (logged, not fatal —
/// shutdown still works via `cancel`/`CmdStopAll`).
pub async fn signal_future() {
    let handlers = (
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()),
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()),
    );
    let (Ok(mut term), Ok(mut int)) = handlers else {
        tracing::warn!("failed to install signal handlers");
        std::future::pending::<()>().await;
        unreachable!()
    };
    tokio::select! {
        _ = term.recv() => {}
        _ = int.recv() => {}
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
