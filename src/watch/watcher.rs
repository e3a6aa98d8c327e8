// src/watch/watcher.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::sync::Registry;

/// Handle for all active filesystem watchers.
///
/// This exists mainly so the underlying `RecommendedWatcher`s are kept alive
/// for as long as needed; dropping (or calling [`WatchSet::stop`]) stops file
/// watching.
pub struct WatchSet {
    watchers: Vec<RecommendedWatcher>,
}

impl std::fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSet")
            .field("active", &self.watchers.len())
            .finish()
    }
}

impl WatchSet {
    /// Close every active watch. Idempotent; called on normal exit, on
    /// INT/TERM, and on fatal errors from any other component.
    pub fn stop(&mut self) {
        if !self.watchers.is_empty() {
            info!(count = self.watchers.len(), "stopping file watchers");
        }
        self.watchers.clear();
    }
}

/// Create one watcher per mirror group, each subscribed to the full member
/// list (anchor plus every destination), and forward raw events into the
/// runtime channel.
///
/// Events that arrive before a watcher's member subscriptions have all
/// completed are discarded, so the watcher's own setup is never
/// mis-classified as a change.
pub fn start_watching(
    registry: &Arc<Registry>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatchSet> {
    let mut watchers = Vec::new();

    for group in registry.groups() {
        let ready = Arc::new(AtomicBool::new(false));

        // Channel from the blocking notify callback into the async world.
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            {
                let ready = Arc::clone(&ready);
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        if !ready.load(Ordering::Acquire) {
                            return;
                        }
                        // If the bridge channel is closed the runtime is
                        // gone; nothing left to forward to.
                        let _ = event_tx.send(event);
                    }
                    Err(err) => {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("dirmirror: file watch error: {err}");
                    }
                }
            },
            Config::default(),
        )?;

        for member in group.members() {
            watcher.watch(member, RecursiveMode::Recursive)?;
        }
        ready.store(true, Ordering::Release);

        info!(
            anchor = %group.anchor().display(),
            members = group.members().len(),
            "watching mirror group"
        );

        // Async task that consumes notify events and forwards them to the runtime.
        let runtime_tx = runtime_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!("received notify event: {:?}", event);

                for path in event.paths {
                    let forwarded = runtime_tx
                        .send(RuntimeEvent::FsChange {
                            kind: event.kind,
                            path,
                        })
                        .await;
                    if forwarded.is_err() {
                        // Runtime channel closed; no point keeping this loop alive.
                        return;
                    }
                }
            }

            debug!("file watcher loop ended");
        });

        watchers.push(watcher);
    }

    Ok(WatchSet { watchers })
}
