// SPDX-License-Identifier: MIT

//! Host process enumeration for preflight: find processes whose working
//! directory collides with a service directory we're about to start, so we
//! can reap a stray instance left over from a previous run.

/// A single host process as seen by preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProcess {
    pub pid: i32,
    pub cwd: std::path::PathBuf,
    pub name: String,
}

/// Lists every process on the host. Entries whose CWD cannot be resolved
/// (permission denied, already exited) are simply omitted rather than
/// erroring the whole scan.
pub trait ProcessScanner: Send + Sync + 'static {
    fn scan(&self) -> Vec<HostProcess>;
}

/// Real implementation: walks `/proc/*/cwd` on Linux. Other platforms get
/// an empty scan — preflight degrades to a no-op reaper rather than
/// failing the run, since stray-process reaping is a convenience, not a
/// correctness requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessScanner;

impl ProcessScanner for SystemProcessScanner {
    #[cfg(target_os = "linux")]
    fn scan(&self) -> Vec<HostProcess> {
        linux::scan()
    }

    #[cfg(not(target_os = "linux"))]
    fn scan(&self) -> Vec<HostProcess> {
        Vec::new()
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::HostProcess;
    use std::fs;

    pub fn scan() -> Vec<HostProcess> {
        let own_pid = std::process::id();
        let mut out = Vec::new();
        let Ok(entries) = fs::read_dir("/proc") else {
            return out;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(pid_str) = file_name.to_str() else {
                continue;
            };
            let Ok(pid) = pid_str.parse::<u32>() else {
                continue;
            };
            if pid == own_pid {
                continue;
            }
            let proc_dir = entry.path();
            let Ok(cwd) = fs::read_link(proc_dir.join("cwd")) else {
                continue;
            };
            let name = fs::read_to_string(proc_dir.join("comm"))
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            out.push(HostProcess {
                pid: pid as i32,
                cwd,
                name,
            });
        }
        out
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{HostProcess, ProcessScanner};
    use parking_lot::Mutex;

    /// Returns a fixed, caller-supplied process list.
    #[derive(Debug, Default)]
    pub struct FakeProcessScanner {
        processes: Mutex<Vec<HostProcess>>,
    }

    impl FakeProcessScanner {
        pub fn new(processes: Vec<HostProcess>) -> Self {
            Self {
                processes: Mutex::new(processes),
            }
        }

        pub fn set(&self, processes: Vec<HostProcess>) {
            *self.processes.lock() = processes;
        }
    }

    impl ProcessScanner for FakeProcessScanner {
        fn scan(&self) -> Vec<HostProcess> {
            self.processes.lock().clone()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessScanner;

#[cfg(test)]
#[path = "process_scanner_tests.rs"]
mod tests;
