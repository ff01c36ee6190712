// SPDX-License-Identifier: MIT

//! The closed set of bus message kinds and their associated data.

use std::time::SystemTime;

/// Supervisor run phase. Strictly non-decreasing over a single `Runner::run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Startup,
    Running,
    Stopping,
    Stopped,
}

/// The closed set of message kinds carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    PhaseChanged,
    ProfileResolved,
    TierStarting,
    TierReady,
    ServiceStarting,
    ServiceReady,
    ServiceFailed,
    ServiceStopping,
    ServiceStopped,
    ServiceRestarting,
    WatchStarted,
    WatchStopped,
    WatchTriggered,
    PreflightStarted,
    PreflightKill,
    PreflightComplete,
    Signal,
    CmdStopService,
    CmdRestartService,
    CmdStopAll,
}

/// Tagged data variant matching [`MessageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageData {
    PhaseChanged {
        phase: Phase,
    },
    ProfileResolved {
        profile: String,
        tiers: Vec<String>,
    },
    TierStarting {
        tier: String,
        services: Vec<String>,
    },
    TierReady {
        tier: String,
    },
    ServiceStarting {
        service: String,
        tier: String,
        attempt: u32,
    },
    ServiceReady {
        service: String,
        duration_ms: u64,
    },
    ServiceFailed {
        service: String,
        error: String,
    },
    ServiceStopping {
        service: String,
    },
    ServiceStopped {
        service: String,
    },
    ServiceRestarting {
        service: String,
    },
    WatchStarted {
        service: String,
    },
    WatchStopped {
        service: String,
    },
    WatchTriggered {
        service: String,
        changed_files: Vec<String>,
    },
    PreflightStarted {
        services: Vec<String>,
    },
    PreflightKill {
        service: String,
        pid: i32,
    },
    PreflightComplete {
        killed: usize,
    },
    Signal {
        name: &'static str,
    },
    CmdStopService {
        service: String,
    },
    CmdRestartService {
        service: String,
    },
    CmdStopAll,
}

impl MessageData {
    /// The [`MessageKind`] tag for this data.
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageData::PhaseChanged { .. } => MessageKind::PhaseChanged,
            MessageData::ProfileResolved { .. } => MessageKind::ProfileResolved,
            MessageData::TierStarting { .. } => MessageKind::TierStarting,
            MessageData::TierReady { .. } => MessageKind::TierReady,
            MessageData::ServiceStarting { .. } => MessageKind::ServiceStarting,
            MessageData::ServiceReady { .. } => MessageKind::ServiceReady,
            MessageData::ServiceFailed { .. } => MessageKind::ServiceFailed,
            MessageData::ServiceStopping { .. } => MessageKind::ServiceStopping,
            MessageData::ServiceStopped { .. } => MessageKind::ServiceStopped,
            MessageData::ServiceRestarting { .. } => MessageKind::ServiceRestarting,
            MessageData::WatchStarted { .. } => MessageKind::WatchStarted,
            MessageData::WatchStopped { .. } => MessageKind::WatchStopped,
            MessageData::WatchTriggered { .. } => MessageKind::WatchTriggered,
            MessageData::PreflightStarted { .. } => MessageKind::PreflightStarted,
            MessageData::PreflightKill { .. } => MessageKind::PreflightKill,
            MessageData::PreflightComplete { .. } => MessageKind::PreflightComplete,
            MessageData::Signal { .. } => MessageKind::Signal,
            MessageData::CmdStopService { .. } => MessageKind::CmdStopService,
            MessageData::CmdRestartService { .. } => MessageKind::CmdRestartService,
            MessageData::CmdStopAll => MessageKind::CmdStopAll,
        }
    }

    /// Whether delivery of this message must be attempted even to a
    /// full subscriber mailbox.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            MessageData::ServiceFailed { .. }
                | MessageData::WatchTriggered { .. }
                | MessageData::Signal { .. }
        )
    }
}

/// A single bus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub timestamp: SystemTime,
    pub data: MessageData,
}

impl Message {
    pub fn new(timestamp: SystemTime, data: MessageData) -> Self {
        Self { timestamp, data }
    }

    pub fn kind(&self) -> MessageKind {
        self.data.kind()
    }

    pub fn is_critical(&self) -> bool {
        self.data.is_critical()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
