// SPDX-License-Identifier: MIT

//! Process-group discipline: every child is started as its own process
//! group leader so a single signal reaches the whole tree it may have
//! spawned (shells, `make` sub-processes, etc).

use std::time::Duration;

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;

use crate::process::ProcessHandle;

/// Marks `cmd` so its child becomes its own process-group leader, letting
/// [`terminate`] signal the whole tree with one `killpg` call.
pub fn configure(cmd: &mut tokio::process::Command) {
    cmd.process_group(0);
}

/// Sends SIGTERM to the process group, waits up to `timeout` for the
/// process to exit, then escalates to SIGKILL.
pub async fn terminate(proc: &ProcessHandle, timeout: Duration) {
    let Some(pid) = proc.pid() else {
        return;
    };
    let pid = Pid::from_raw(pid);

    let group_signalled = match killpg(pid, Signal::SIGTERM) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => return,
        Err(e) => {
            tracing::warn!(error = %e, pid = pid.as_raw(), "killpg(SIGTERM) failed, falling back to kill");
            kill(pid, Signal::SIGTERM).is_ok()
        }
    };

    if group_signalled && tokio::time::timeout(timeout, proc.wait_done()).await.is_ok() {
        return;
    }

    if let Err(e) = killpg(pid, Signal::SIGKILL) {
        tracing::warn!(error = %e, pid = pid.as_raw(), "killpg(SIGKILL) failed, falling back to kill");
        let _ = kill(pid, Signal::SIGKILL);
    }
    proc.wait_done().await;
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
