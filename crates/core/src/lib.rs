// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fuku-core: data model for the fuku service supervisor.
//!
//! This crate owns the config schema, the tier/profile topology, the bus
//! message taxonomy, and the error kinds shared by every other crate. It has
//! no process-management or I/O of its own — that lives in `fuku-engine`.

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod message;
pub mod time_fmt;
pub mod topology;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    ConcurrencyConfig, Config, ConfigError, DefaultsConfig, LoggingConfig, LogsConfig,
    ProfileSelector, ReadinessConfig, ReadinessKind, RetryConfig, ServiceConfig, WatchConfig,
};
pub use error::{
    DiscoveryError, LifecycleError, ReadinessError, RunnerError, ServiceError, WorkerPoolError,
};
pub use id::ShortId;
pub use message::{Message, MessageData, MessageKind, Phase};
pub use topology::{Tier, Topology};
