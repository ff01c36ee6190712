// SPDX-License-Identifier: MIT

//! Starts, stops, and restarts a single service, and watches it for
//! unexpected exit.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fuku_adapters::{Logger, LogsBroadcaster};
use fuku_core::{Clock, Config, MessageData, ServiceError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::Bus;
use crate::guard::{Guard, GuardHandle};
use crate::lifecycle;
use crate::process::ProcessHandle;
use crate::readiness;
use crate::registry::Registry;
use crate::watcher::WatchState;

const ENV_FILE_NAME: &str = ".env.development";

/// The collaborators a [`Service`] needs, bundled so the call sites in
/// `Runner` don't thread five separate arguments through every call.
/// Worker-pool gating happens in the caller (`Runner`/`Watcher`), not here —
/// a single `Service::start`/`restart` call does exactly one unit of work.
pub struct Service<C, L, B> {
    pub config: Arc<Config>,
    pub registry: Arc<Registry>,
    pub bus: Bus<C, B>,
    pub guard: Arc<Guard>,
    pub logger: L,
    pub logs: B,
    /// `None` when no watcher is wired up (e.g. unit tests); a crash is
    /// then always reported as an unwatched exit.
    pub watch: Option<Arc<dyn WatchState>>,
}

impl<C, L, B> Service<C, L, B>
where
    C: Clock + Clone,
    L: Logger,
    B: LogsBroadcaster,
{
    pub fn new(
        config: Arc<Config>,
        registry: Arc<Registry>,
        bus: Bus<C, B>,
        guard: Arc<Guard>,
        logger: L,
        logs: B,
        watch: Option<Arc<dyn WatchState>>,
    ) -> Self {
        Self {
            config,
            registry,
            bus,
            guard,
            logger,
            logs,
            watch,
        }
    }

    /// Starts `name`, retrying up to `retry.attempts` times with a linear
    /// backoff between attempts.
    pub async fn start(
        &self,
        cancel: &CancellationToken,
        name: &str,
        tier: &str,
    ) -> Result<(), ServiceError> {
        let service_config = self
            .config
            .services
            .get(name)
            .ok_or_else(|| ServiceError::ServiceNotFound(name.to_string()))?;

        let attempts = self.config.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.retry.backoff) => {}
                    _ = cancel.cancelled() => return Err(ServiceError::MaxRetriesExceeded(name.to_string())),
                }
            }

            match self.try_start(cancel, name, tier, attempt, &service_config.dir).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(service = name, attempt, error = %e, "start attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        self.bus.publish(MessageData::ServiceFailed {
            service: name.to_string(),
            error,
        });
        Err(ServiceError::MaxRetriesExceeded(name.to_string()))
    }

    async fn try_start(
        &self,
        cancel: &CancellationToken,
        name: &str,
        tier: &str,
        attempt: u32,
        dir: &Path,
    ) -> Result<(), ServiceError> {
        if !dir.is_dir() {
            return Err(ServiceError::ServiceDirectoryNotExist(
                dir.display().to_string(),
            ));
        }

        let env_file = dir.join(ENV_FILE_NAME);
        if !env_file.exists() {
            tracing::warn!(service = name, path = %env_file.display(), "no env file found");
        }

        let mut cmd = tokio::process::Command::new("make");
        cmd.arg("run")
            .current_dir(dir)
            .env("ENV_FILE", &env_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        lifecycle::configure(&mut cmd);

        self.bus.publish(MessageData::ServiceStarting {
            service: name.to_string(),
            tier: tier.to_string(),
            attempt,
        });

        let mut child = cmd
            .spawn()
            .map_err(|source| ServiceError::FailedToStartCommand {
                service: name.to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ServiceError::FailedToCreatePipe {
                service: name.to_string(),
                source: std::io::Error::other("stdout not piped"),
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ServiceError::FailedToCreatePipe {
                service: name.to_string(),
                source: std::io::Error::other("stderr not piped"),
            })?;

        let proc = Arc::new(ProcessHandle::new(child));
        let (log_tx, log_rx) = broadcast::channel(64);
        self.spawn_tee(name, stdout, log_tx.clone());
        self.spawn_tee(name, stderr, log_tx);

        let start = Instant::now();
        let readiness_result = readiness::wait_ready(
            self.config.services[name].readiness.as_ref(),
            &proc,
            Some(log_rx),
            cancel,
        )
        .await;

        if let Err(e) = readiness_result {
            lifecycle::terminate(&proc, self.config.retry.backoff.max(Duration::from_secs(1)))
                .await;
            return Err(ServiceError::FailedToStartCommand {
                service: name.to_string(),
                source: std::io::Error::other(e.to_string()),
            });
        }

        proc.signal_ready(None);
        self.registry.add(name, proc.clone(), tier);
        self.spawn_watch_for_exit(name.to_string(), proc.clone());

        self.bus.publish(MessageData::ServiceReady {
            service: name.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        });

        Ok(())
    }

    fn spawn_tee<R>(&self, name: &str, reader: R, tx: broadcast::Sender<String>)
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
    {
        let logger = self.logger.clone();
        let logs = self.logs.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        logger.info(&format!("[{name}] {line}"));
                        logs.broadcast(&name, &line);
                        let _ = tx.send(line);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(service = %name, error = %e, "log stream read error");
                        break;
                    }
                }
            }
        });
    }

    fn spawn_watch_for_exit(&self, name: String, proc: Arc<ProcessHandle>) {
        let registry = self.registry.clone();
        let bus = self.bus.clone();
        let watch = self.watch.clone();
        let runner = proc.clone();
        tokio::spawn(async move {
            runner.run_to_completion().await;
            let outcome = registry.remove(&name, &proc);
            if !outcome.removed || !outcome.unexpected_exit {
                return;
            }
            let armed = watch.as_ref().is_some_and(|w| w.is_armed(&name));
            if armed {
                bus.publish(MessageData::ServiceFailed {
                    service: name,
                    error: "unexpected exit".to_string(),
                });
            } else {
                bus.publish(MessageData::ServiceStopped { service: name });
            }
        });
    }

    /// Stops `name` if currently tracked; a no-op if it is not.
    pub async fn stop(&self, name: &str) {
        let Some(entry) = self.registry.get(name) else {
            return;
        };

        self.bus.publish(MessageData::ServiceStopping {
            service: name.to_string(),
        });
        self.registry.detach(name);
        lifecycle::terminate(&entry.proc, Duration::from_secs(5)).await;
        entry.proc.wait_done().await;
        self.registry.remove(name, &entry.proc);
        self.bus.publish(MessageData::ServiceStopped {
            service: name.to_string(),
        });
    }

    /// Restarts `name`: stops the current instance (if any) then runs the
    /// start sequence once more, without the retry wrapper.
    pub async fn restart(&self, cancel: &CancellationToken, name: &str) {
        if !self.guard.try_lock(name) {
            tracing::debug!(service = name, "restart already in progress, skipping");
            return;
        }
        let _release = GuardHandle::new(&self.guard, name.to_string());

        let Some(service_config) = self.config.services.get(name) else {
            self.bus.publish(MessageData::ServiceFailed {
                service: name.to_string(),
                error: "service not found".to_string(),
            });
            return;
        };

        self.bus.publish(MessageData::ServiceRestarting {
            service: name.to_string(),
        });

        if self.registry.get(name).is_some() {
            self.stop(name).await;
        }

        let tier = service_config
            .tier
            .clone()
            .unwrap_or_else(|| fuku_core::topology::DEFAULT_TIER.to_string());
        if let Err(e) = self.try_start(cancel, name, &tier, 1, &service_config.dir).await {
            self.bus.publish(MessageData::ServiceFailed {
                service: name.to_string(),
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
