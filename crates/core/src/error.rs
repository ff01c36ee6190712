// SPDX-License-Identifier: MIT

//! Error kinds shared across the supervisor. Each enum corresponds to one
//! boundary named in the design: discovery, a single service's lifecycle,
//! a readiness probe, the worker pool, and the top-level runner.

use thiserror::Error;

/// Errors resolving a profile into tiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("profile not found: {0}")]
    ProfileNotFound(String),
    #[error("unsupported profile format for {0}: expected \"*\", a service name, or a list")]
    UnsupportedProfileFormat(String),
    #[error("service not found: {0}")]
    ServiceNotFound(String),
}

/// Errors starting or running a single service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service not found: {0}")]
    ServiceNotFound(String),
    #[error("service directory does not exist: {0}")]
    ServiceDirectoryNotExist(String),
    #[error("failed to create stdio pipe for {service}: {source}")]
    FailedToCreatePipe {
        service: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start command for {service}: {source}")]
    FailedToStartCommand {
        service: String,
        #[source]
        source: std::io::Error,
    },
    #[error("service {0} exceeded max retries")]
    MaxRetriesExceeded(String),
}

/// Errors from a readiness probe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("invalid regex pattern: {0}")]
    InvalidRegexPattern(String),
    #[error("readiness timed out")]
    ReadinessTimeout,
    #[error("process exited before becoming ready")]
    ProcessExited,
    #[error("readiness probe cancelled")]
    Cancelled,
    #[error("port already in use: {0}")]
    PortAlreadyInUse(String),
}

/// Errors acquiring a worker-pool permit.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPoolError {
    #[error("failed to acquire worker: cancelled")]
    FailedToAcquireWorker,
}

/// Errors terminating a child process. Carries only the failing pid and a
/// rendered cause — `fuku-engine` is the crate that actually depends on
/// `nix` and knows what an errno means.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("failed to terminate process {pid}: {cause}")]
    FailedToTerminateProcess { pid: i32, cause: String },
}

/// Top-level runner errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("startup interrupted")]
    StartupInterrupted,
    #[error("command channel closed")]
    CommandChannelClosed,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
