// src/engine/runtime.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{DirmirrorError, Result};
use crate::handler::{run_handler_command, OnChange};
use crate::sync::{classify, propagate, Registry};

/// Events sent into the runtime from the watchers or external signals.
///
/// - watchers send `FsChange`
/// - spawned propagations report `PropagationFailed`
/// - the signal handler sends `ShutdownRequested`
#[derive(Debug)]
pub enum RuntimeEvent {
    FsChange { kind: EventKind, path: PathBuf },
    PropagationFailed(DirmirrorError),
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Per-group debounce window in milliseconds.
    pub sync_timeout_ms: u64,
}

/// The main event loop.
///
/// Responsibilities:
/// - Consume `RuntimeEvent`s from watchers and the signal handler.
/// - Classify each raw change against the registry.
/// - Dispatch through the configured on-change handler (built-in pipeline,
///   external command, or embedder callback).
/// - Stop on the first propagation failure; the error is fatal to the whole
///   process, never isolated to the failing group.
pub struct Runtime {
    registry: Arc<Registry>,
    handler: OnChange,
    options: RuntimeOptions,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<RuntimeEvent>,

    /// Used by spawned propagations to report failures back into the loop.
    events_tx: mpsc::Sender<RuntimeEvent>,
}

impl Runtime {
    pub fn new(
        registry: Arc<Registry>,
        handler: OnChange,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            registry,
            handler,
            options,
            events_rx,
            events_tx,
        }
    }

    /// Main event loop. Runs until shutdown is requested, every producer is
    /// gone, or a propagation fails.
    pub async fn run(mut self) -> Result<()> {
        info!("dirmirror runtime started");

        while let Some(event) = self.events_rx.recv().await {
            match event {
                RuntimeEvent::FsChange { kind, path } => self.handle_change(kind, path),
                RuntimeEvent::PropagationFailed(err) => {
                    return Err(err);
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    break;
                }
            }
        }

        info!("dirmirror runtime exiting");
        Ok(())
    }

    /// Dispatch one raw change through the configured handler.
    ///
    /// The work is spawned rather than awaited so a slow propagation never
    /// blocks event intake for other groups; failures come back through the
    /// event channel as `PropagationFailed`.
    fn handle_change(&self, kind: EventKind, path: PathBuf) {
        match &self.handler {
            OnChange::Pipeline => {
                let Some(change_kind) = classify::change_kind(&kind) else {
                    return;
                };
                let Some(change) = classify::classify(&self.registry, &path, change_kind) else {
                    debug!(path = %path.display(), "change outside managed groups, dropping");
                    return;
                };

                let registry = Arc::clone(&self.registry);
                let events_tx = self.events_tx.clone();
                let sync_timeout_ms = self.options.sync_timeout_ms;
                tokio::spawn(async move {
                    let Some(group) = registry.group(&change.anchor) else {
                        return;
                    };
                    if let Err(err) = propagate(group, &change, sync_timeout_ms).await {
                        let _ = events_tx.send(RuntimeEvent::PropagationFailed(err)).await;
                    }
                });
            }
            OnChange::Command(program) => {
                let program = program.clone();
                let events_tx = self.events_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = run_handler_command(&program, &kind, &path).await {
                        let _ = events_tx.send(RuntimeEvent::PropagationFailed(err)).await;
                    }
                });
            }
            OnChange::Callback(callback) => {
                let fut = callback(Arc::clone(&self.registry), kind, path);
                let events_tx = self.events_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = fut.await {
                        let _ = events_tx.send(RuntimeEvent::PropagationFailed(err)).await;
                    }
                });
            }
        }
    }
}
