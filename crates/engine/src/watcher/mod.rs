// SPDX-License-Identifier: MIT

//! Arms a debounced filesystem watch for each service as it becomes ready,
//! and turns matching changes into `WatchTriggered` bus messages.

pub mod debounce;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fuku_adapters::{LogsBroadcaster, Matcher};
use fuku_core::{Clock, Message, MessageData};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::bus::Bus;
use crate::error::WatcherError;
use debounce::Debouncer;

struct ArmedService<M> {
    root: PathBuf,
    shared: Vec<PathBuf>,
    matcher: M,
    debouncer: Arc<Debouncer>,
}

/// Narrow seam `Service::spawn_watch_for_exit` queries to tell an
/// unwatched crash (publish `ServiceStopped`) from a watched one (publish
/// `ServiceFailed`, leaving the Watcher armed for the next file change).
pub trait WatchState: Send + Sync {
    fn is_armed(&self, name: &str) -> bool;
}

impl<M> WatchState for FileWatcher<M>
where
    M: Send + 'static,
{
    fn is_armed(&self, name: &str) -> bool {
        self.armed.lock().contains_key(name)
    }
}

/// Arms/disarms per-service debounced watches driven by bus events.
pub struct FileWatcher<M> {
    inner: Arc<Mutex<RecommendedWatcher>>,
    armed: Arc<Mutex<HashMap<String, ArmedService<M>>>>,
    reverse: Arc<Mutex<HashMap<PathBuf, Vec<String>>>>,
    fire_rx_map: Arc<Mutex<HashMap<String, mpsc::Receiver<Vec<PathBuf>>>>>,
}

impl<M> FileWatcher<M>
where
    M: Matcher,
{
    pub fn new() -> Result<(Self, mpsc::Receiver<notify::Result<Event>>), WatcherError> {
        let (tx, rx) = mpsc::channel(256);
        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.blocking_send(res);
            },
            notify::Config::default(),
        )
        .map_err(WatcherError::Init)?;

        Ok((
            Self {
                inner: Arc::new(Mutex::new(watcher)),
                armed: Arc::new(Mutex::new(HashMap::new())),
                reverse: Arc::new(Mutex::new(HashMap::new())),
                fire_rx_map: Arc::new(Mutex::new(HashMap::new())),
            },
            rx,
        ))
    }

    /// Arms `name`: walks `root` and `shared`, registers every
    /// non-ignored directory with the OS watcher, and starts a debouncer
    /// whose fires this function's caller should drain via the returned
    /// per-service receiver (stashed in `fire_rx_map`, drained by `Runner`).
    pub fn arm(&self, name: &str, root: &Path, shared: &[PathBuf], matcher: M, debounce: std::time::Duration) {
        let (fire_tx, fire_rx) = mpsc::channel(16);
        let debouncer = Arc::new(Debouncer::new(debounce, fire_tx));

        let mut dirs = vec![root.to_path_buf()];
        dirs.extend(shared.iter().cloned());

        let mut reverse = self.reverse.lock();
        for base in &dirs {
            for entry in WalkDir::new(base).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_dir() {
                    continue;
                }
                let path = entry.path();
                let rel = path.strip_prefix(base).unwrap_or(path);
                if !matcher.match_dir(rel) {
                    continue;
                }
                if let Err(e) = watch_dir(&self.inner, path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to watch directory");
                    continue;
                }
                reverse
                    .entry(path.to_path_buf())
                    .or_default()
                    .push(name.to_string());
            }
        }
        drop(reverse);

        self.armed.lock().insert(
            name.to_string(),
            ArmedService {
                root: root.to_path_buf(),
                shared: shared.to_vec(),
                matcher,
                debouncer,
            },
        );
        self.fire_rx_map.lock().insert(name.to_string(), fire_rx);
    }

    /// Disarms `name`: stops its debouncer and removes it from both maps.
    pub fn disarm(&self, name: &str) {
        if let Some(service) = self.armed.lock().remove(name) {
            service.debouncer.stop();
        }
        self.fire_rx_map.lock().remove(name);
        self.reverse
            .lock()
            .values_mut()
            .for_each(|names| names.retain(|n| n != name));
    }

    /// Takes the fire receiver for `name`, if armed and not already taken.
    pub fn take_fire_receiver(&self, name: &str) -> Option<mpsc::Receiver<Vec<PathBuf>>> {
        self.fire_rx_map.lock().remove(name)
    }

    /// Handles one raw `notify::Event`: filters by kind, resolves which
    /// armed services care about the path, and feeds matches to their
    /// debouncer.
    pub fn handle_event(&self, event: &Event) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }

        for path in &event.paths {
            let Some(parent) = path.parent() else {
                continue;
            };
            let subscribers = self.reverse.lock().get(parent).cloned().unwrap_or_default();
            if subscribers.is_empty() {
                continue;
            }

            let armed = self.armed.lock();
            for name in &subscribers {
                let Some(service) = armed.get(name) else {
                    continue;
                };
                let Some(rel) = relative_to(path, &service.root, &service.shared) else {
                    continue;
                };
                if service.matcher.is_match(&rel) {
                    service.debouncer.trigger(rel);
                }
            }
        }
    }
}

fn watch_dir(watcher: &Mutex<RecommendedWatcher>, path: &Path) -> Result<(), WatcherError> {
    watcher
        .lock()
        .watch(path, RecursiveMode::NonRecursive)
        .map_err(|source| WatcherError::Watch {
            path: path.to_path_buf(),
            source,
        })
}

fn relative_to(path: &Path, root: &Path, shared: &[PathBuf]) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        if !rel.starts_with("..") {
            return Some(rel.to_path_buf());
        }
    }
    for base in shared {
        if let Ok(rel) = path.strip_prefix(base) {
            if !rel.starts_with("..") {
                return Some(rel.to_path_buf());
            }
        }
    }
    None
}

/// Subscribes to the bus and arms/disarms services on `ServiceReady`/
/// `ServiceStopped`, publishing `WatchStarted`/`WatchStopped`.
pub async fn run_bus_loop<C, L, M>(
    watcher: Arc<FileWatcher<M>>,
    bus: Bus<C, L>,
    config: Arc<fuku_core::Config>,
    mut make_matcher: impl FnMut(&fuku_core::WatchConfig) -> M,
    cancel: CancellationToken,
) where
    C: Clock + Clone,
    L: LogsBroadcaster,
    M: Matcher,
{
    let mut rx = bus.subscribe(cancel.child_token());
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                handle_bus_message(&watcher, &bus, &config, &mut make_matcher, &msg);
            }
        }
    }
}

fn handle_bus_message<C, L, M>(
    watcher: &FileWatcher<M>,
    bus: &Bus<C, L>,
    config: &fuku_core::Config,
    make_matcher: &mut impl FnMut(&fuku_core::WatchConfig) -> M,
    msg: &Message,
) where
    C: Clock + Clone,
    L: LogsBroadcaster,
    M: Matcher,
{
    match &msg.data {
        MessageData::ServiceReady { service } => {
            let Some(service_config) = config.services.get(service) else {
                return;
            };
            let Some(watch_config) = &service_config.watch else {
                return;
            };
            let matcher = make_matcher(watch_config);
            watcher.arm(
                service,
                &service_config.dir,
                &watch_config.shared,
                matcher,
                watch_config.debounce_or_default(),
            );
            if let Some(mut fire_rx) = watcher.take_fire_receiver(service) {
                let bus = bus.clone();
                let service = service.clone();
                tokio::spawn(async move {
                    while let Some(changed) = fire_rx.recv().await {
                        bus.publish(MessageData::WatchTriggered {
                            service: service.clone(),
                            changed_files: changed
                                .iter()
                                .map(|p| p.display().to_string())
                                .collect(),
                        });
                    }
                });
            }
            bus.publish(MessageData::WatchStarted {
                service: service.clone(),
            });
        }
        MessageData::ServiceStopped { service } => {
            watcher.disarm(service);
            bus.publish(MessageData::WatchStopped {
                service: service.clone(),
            });
        }
        // Deliberately stays armed on ServiceFailed.
        _ => {}
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
