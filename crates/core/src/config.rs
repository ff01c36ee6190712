// SPDX-License-Identifier: MIT

//! `fuku.yaml` schema, loading, and validation.
//!
//! Loading is deliberately two-phase: [`Config::from_yaml`] only does
//! structural `serde` deserialization, while [`Config::validate`] checks
//! cross-field invariants (unknown profile services, bad regex, etc.) and
//! accumulates every problem it finds rather than bailing on the first one —
//! a YAML file with five typos should report five errors, not one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_version() -> u32 {
    1
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> Duration {
    Duration::from_millis(500)
}

fn default_logs_buffer() -> usize {
    10
}

fn default_readiness_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_readiness_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_debounce() -> Duration {
    Duration::from_millis(300)
}

/// Top-level `fuku.yaml` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// `IndexMap` so declaration order survives YAML parsing — `Topology`
    /// needs the user's file order to compute tier ordering (first
    /// appearance of each tier name, in document order).
    pub services: IndexMap<String, ServiceConfig>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,
    #[serde(with = "humantime_serde", default = "default_retry_backoff")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            backoff: default_retry_backoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_logs_buffer")]
    pub buffer: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            buffer: default_logs_buffer(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub tier: Option<String>,
    #[serde(default)]
    pub profiles: Vec<String>,
}

/// A single service's declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub dir: PathBuf,
    pub tier: Option<String>,
    #[serde(default)]
    pub profiles: Vec<String>,
    pub readiness: Option<ReadinessConfig>,
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessKind {
    Http,
    Tcp,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(rename = "type")]
    pub kind: ReadinessKind,
    pub url: Option<String>,
    pub address: Option<String>,
    pub pattern: Option<String>,
    #[serde(with = "humantime_serde", default = "default_readiness_timeout")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_readiness_interval")]
    pub interval: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub shared: Vec<PathBuf>,
    #[serde(with = "humantime_serde::option", default)]
    pub debounce: Option<Duration>,
}

impl WatchConfig {
    /// The effective debounce window, falling back to the spec default.
    pub fn debounce_or_default(&self) -> Duration {
        self.debounce.unwrap_or_else(default_debounce)
    }
}

/// `profiles.<name>` is `"*"`, a bare service name, or an ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSelector {
    All(AllMarker),
    One(String),
    Many(Vec<String>),
}

/// Deserializes only from the literal string `"*"`; any other bare string
/// falls through to [`ProfileSelector::One`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllMarker;

impl<'de> Deserialize<'de> for AllMarker {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "*" {
            Ok(AllMarker)
        } else {
            Err(serde::de::Error::custom("expected \"*\""))
        }
    }
}

/// Errors loading or validating `fuku.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

impl Config {
    /// Load and validate a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse (but do not validate) a YAML document.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check cross-field invariants, accumulating every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (name, service) in &self.services {
            if let Some(readiness) = &service.readiness {
                match readiness.kind {
                    ReadinessKind::Http if readiness.url.is_none() => {
                        errors.push(format!("service {name}: readiness type http requires url"));
                    }
                    ReadinessKind::Tcp if readiness.address.is_none() => {
                        errors.push(format!(
                            "service {name}: readiness type tcp requires address"
                        ));
                    }
                    ReadinessKind::Log => match &readiness.pattern {
                        None => errors.push(format!(
                            "service {name}: readiness type log requires pattern"
                        )),
                        Some(pattern) => {
                            if let Err(e) = regex_lite_check(pattern) {
                                errors.push(format!(
                                    "service {name}: invalid readiness pattern {pattern:?}: {e}"
                                ));
                            }
                        }
                    },
                    _ => {}
                }
            }

            if let Some(watch) = &service.watch {
                for pattern in watch.include.iter().chain(watch.ignore.iter()) {
                    if glob_lite_check(pattern).is_err() {
                        errors.push(format!(
                            "service {name}: invalid glob pattern {pattern:?}"
                        ));
                    }
                }
            }
        }

        for (profile_name, selector) in &self.profiles {
            let names: Vec<&str> = match selector {
                ProfileSelector::All(_) => Vec::new(),
                ProfileSelector::One(s) => vec![s.as_str()],
                ProfileSelector::Many(v) => v.iter().map(String::as_str).collect(),
            };
            for name in names {
                if !self.services.contains_key(name) {
                    errors.push(format!(
                        "profile {profile_name}: unknown service {name:?}"
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Cheap regex syntax check without compiling a real `Regex` (that lives in
/// `fuku-engine`, which depends on the `regex` crate). We only need to catch
/// obviously unbalanced patterns at config-load time; the real compile
/// happens in the readiness probe and is authoritative.
fn regex_lite_check(pattern: &str) -> Result<(), &'static str> {
    let mut depth = 0i32;
    for c in pattern.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced parentheses");
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        Err("unbalanced parentheses")
    } else {
        Ok(())
    }
}

fn glob_lite_check(pattern: &str) -> Result<(), &'static str> {
    let mut depth = 0i32;
    for c in pattern.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
    }
    if depth != 0 {
        Err("unbalanced brackets")
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
