// SPDX-License-Identifier: MIT

//! The publish/subscribe message bus every other component reports through.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fuku_adapters::LogsBroadcaster;
use fuku_core::{Clock, Message, MessageData};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Subscriber {
    tx: mpsc::Sender<Arc<Message>>,
}

/// In-process event bus. Cheap to clone; every clone shares the same
/// subscriber list and `closed` flag.
pub struct Bus<C, L> {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    closed: Arc<AtomicBool>,
    buffer: usize,
    clock: C,
    logs: L,
}

impl<C, L> Clone for Bus<C, L>
where
    C: Clone,
    L: Clone,
{
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            closed: self.closed.clone(),
            buffer: self.buffer,
            clock: self.clock.clone(),
            logs: self.logs.clone(),
        }
    }
}

impl<C, L> Bus<C, L>
where
    C: Clock + Clone,
    L: LogsBroadcaster,
{
    pub fn new(buffer: usize, clock: C, logs: L) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            buffer: buffer.max(1),
            clock,
            logs,
        }
    }

    /// Registers a new subscriber. The returned receiver is closed either by
    /// `cancel` firing or by [`Bus::close`].
    pub fn subscribe(&self, cancel: CancellationToken) -> mpsc::Receiver<Arc<Message>> {
        let (tx, rx) = mpsc::channel(self.buffer);
        self.subscribers.write().push(Subscriber { tx: tx.clone() });

        let subscribers = self.subscribers.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            subscribers.write().retain(|s| !s.tx.same_channel(&tx));
            drop(tx);
        });

        rx
    }

    /// Publishes a message built from `data` at the current clock time.
    /// No-op once [`Bus::close`] has been called.
    pub fn publish(&self, data: MessageData) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        let critical = data.is_critical();
        tracing::debug!(kind = ?data.kind(), critical, "bus publish");
        self.logs.broadcast("supervisor", &format!("{:?}", data.kind()));

        let message = Arc::new(Message::new(self.clock.now(), data));

        let subscribers = self.subscribers.read();
        for sub in subscribers.iter() {
            match sub.tx.try_send(message.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(msg)) if critical => {
                    let tx = sub.tx.clone();
                    tokio::spawn(async move {
                        if tx.send(msg).await.is_err() {
                            tracing::debug!("critical message dropped: subscriber gone");
                        }
                    });
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!("subscriber mailbox full, dropping non-critical message");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Drops every subscriber and marks the bus closed; idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.subscribers.write().clear();
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
