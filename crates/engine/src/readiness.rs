// SPDX-License-Identifier: MIT

//! Readiness probes: HTTP, TCP, and log-pattern, each racing the process's
//! own exit and the caller's cancellation so a dying child doesn't leave a
//! probe spinning until its timeout.

use std::sync::Arc;
use std::time::Duration;

use fuku_core::{ReadinessConfig, ReadinessError, ReadinessKind};
use regex::Regex;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::process::ProcessHandle;

/// Runs the configured readiness probe, or succeeds immediately if `config`
/// is `None` (a service with no readiness check is ready as soon as it
/// spawns).
pub async fn wait_ready(
    config: Option<&ReadinessConfig>,
    proc: &ProcessHandle,
    log_lines: Option<tokio::sync::broadcast::Receiver<String>>,
    cancel: &CancellationToken,
) -> Result<(), ReadinessError> {
    let Some(config) = config else {
        return Ok(());
    };

    let probe = match config.kind {
        ReadinessKind::Http => probe_http(config).boxed(),
        ReadinessKind::Tcp => probe_tcp(config).boxed(),
        ReadinessKind::Log => match log_lines {
            Some(rx) => probe_log(config, rx).boxed(),
            None => {
                return Err(ReadinessError::InvalidRegexPattern(
                    "log readiness requested with no log stream".to_string(),
                ))
            }
        },
    };

    tokio::select! {
        result = tokio::time::timeout(config.timeout, probe) => {
            result.unwrap_or(Err(ReadinessError::ReadinessTimeout))
        }
        _ = proc.wait_done() => Err(ReadinessError::ProcessExited),
        _ = cancel.cancelled() => Err(ReadinessError::Cancelled),
    }
}

/// Small boxing helper so `wait_ready` can hold one of three differently
/// typed futures behind a single `tokio::select!` arm.
trait BoxFuture<'a, T>: std::future::Future<Output = T> + Send + 'a {}
impl<'a, T, F: std::future::Future<Output = T> + Send + 'a> BoxFuture<'a, T> for F {}

trait Boxable<'a, T> {
    fn boxed(self) -> std::pin::Pin<Box<dyn BoxFuture<'a, T> + 'a>>;
}
impl<'a, T, F: BoxFuture<'a, T> + 'a> Boxable<'a, T> for F {
    fn boxed(self) -> std::pin::Pin<Box<dyn BoxFuture<'a, T> + 'a>> {
        Box::pin(self)
    }
}

async fn probe_http(config: &ReadinessConfig) -> Result<(), ReadinessError> {
    let url = config.url.clone().ok_or_else(|| {
        ReadinessError::InvalidRegexPattern("http readiness requires a url".to_string())
    })?;
    let client = reqwest::Client::new();
    loop {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(config.interval).await,
        }
    }
}

async fn probe_tcp(config: &ReadinessConfig) -> Result<(), ReadinessError> {
    let address = config
        .address
        .clone()
        .ok_or_else(|| ReadinessError::InvalidRegexPattern("tcp readiness requires an address".to_string()))?;
    loop {
        match TcpStream::connect(&address).await {
            Ok(_) => return Ok(()),
            Err(e) if is_address_in_use(&e) => {
                return Err(ReadinessError::PortAlreadyInUse(address));
            }
            Err(_) => tokio::time::sleep(config.interval).await,
        }
    }
}

fn is_address_in_use(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::AddrInUse
}

async fn probe_log(
    config: &ReadinessConfig,
    mut lines: tokio::sync::broadcast::Receiver<String>,
) -> Result<(), ReadinessError> {
    let pattern = config
        .pattern
        .clone()
        .ok_or_else(|| ReadinessError::InvalidRegexPattern("log readiness requires a pattern".to_string()))?;
    let regex = Arc::new(
        Regex::new(&pattern).map_err(|e| ReadinessError::InvalidRegexPattern(e.to_string()))?,
    );

    loop {
        match lines.recv().await {
            Ok(line) if regex.is_match(&line) => return Ok(()),
            Ok(_) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
