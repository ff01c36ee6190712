// SPDX-License-Identifier: MIT

//! Reaps stray host processes left over from a previous, uncleanly-stopped
//! run, identified by a working directory collision with a service we're
//! about to (re)start.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use fuku_adapters::ProcessScanner;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tokio_util::sync::CancellationToken;

use crate::bus::Bus;
use crate::worker_pool::WorkerPool;
use fuku_core::{Clock, MessageData};

const LIVENESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scans the host for stray processes whose CWD matches one of `services`
/// and kills them, bounded by `pool` and `kill_timeout`.
pub async fn run<C, L>(
    scanner: &dyn ProcessScanner,
    services: &HashMap<String, std::path::PathBuf>,
    bus: &Bus<C, L>,
    pool: &WorkerPool,
    cancel: &CancellationToken,
    kill_timeout: Duration,
) where
    C: Clock + Clone,
    L: fuku_adapters::LogsBroadcaster,
{
    let mut sorted_names: Vec<&String> = services.keys().collect();
    sorted_names.sort();
    bus.publish(MessageData::PreflightStarted {
        services: sorted_names.into_iter().cloned().collect(),
    });

    let own_pid = std::process::id();
    let matches: Vec<(String, i32)> = scanner
        .scan()
        .into_iter()
        .filter(|p| p.pid as u32 != own_pid)
        .filter_map(|p| {
            services
                .iter()
                .find(|(_, dir)| same_dir(dir, &p.cwd))
                .map(|(service, _)| (service.clone(), p.pid))
        })
        .collect();

    let mut join_set = tokio::task::JoinSet::new();
    for (service, pid) in matches {
        let permit = match pool.acquire(cancel).await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let cancel = cancel.clone();
        let bus = bus.clone();
        join_set.spawn(async move {
            let _permit = permit;
            kill_and_wait(pid, kill_timeout, &cancel).await;
            bus.publish(MessageData::PreflightKill { service, pid });
        });
    }

    let killed = join_set.len();
    while join_set.join_next().await.is_some() {}

    bus.publish(MessageData::PreflightComplete { killed });
}

async fn kill_and_wait(pid: i32, timeout: Duration, cancel: &CancellationToken) {
    let pid = Pid::from_raw(pid);
    if killpg(pid, Signal::SIGTERM).is_err() && kill(pid, Signal::SIGTERM).is_err() {
        return;
    }

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::time::Instant::now() >= deadline {
            break;
        }
        if kill(pid, None).is_err() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(LIVENESS_POLL_INTERVAL) => {}
            _ = cancel.cancelled() => return,
        }
    }

    let _ = killpg(pid, Signal::SIGKILL);
    let _ = kill(pid, Signal::SIGKILL);
}

fn same_dir(a: &Path, b: &Path) -> bool {
    a == b
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
