// src/handler.rs

//! Pluggable on-change handling.
//!
//! The default pipeline (classify + propagate) can be replaced two ways:
//! - a configured external executable, spawned per event with the event kind
//!   and the changed path as arguments (`--on-change`, `DIRMIRROR_ON_CHANGE`,
//!   or the config's `on_change` key);
//! - a Rust callback supplied by a library embedder through
//!   [`crate::run_sync`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use notify::EventKind;
use tokio::process::Command;
use tracing::info;

use crate::config::model::ConfigFile;
use crate::errors::{DirmirrorError, Result};
use crate::sync::builder::resolve_path;
use crate::sync::Registry;

/// Embedder-supplied replacement for the whole classify + propagate pipeline.
///
/// Receives the registry state, the raw event kind, and the absolute changed
/// path, and resolves once the change has been handled.
pub type ChangeCallback = Arc<
    dyn Fn(Arc<Registry>, EventKind, PathBuf) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>
        + Send
        + Sync,
>;

/// How change events are handled.
pub enum OnChange {
    /// Built-in pipeline: classify against the registry, then propagate.
    Pipeline,
    /// Spawn this executable for every event.
    Command(PathBuf),
    /// Invoke an embedder-supplied callback for every event.
    Callback(ChangeCallback),
}

impl std::fmt::Debug for OnChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnChange::Pipeline => f.write_str("OnChange::Pipeline"),
            OnChange::Command(path) => f.debug_tuple("OnChange::Command").field(path).finish(),
            OnChange::Callback(_) => f.write_str("OnChange::Callback(..)"),
        }
    }
}

/// Pick the handler: embedder callback first, then the CLI flag, then
/// `DIRMIRROR_ON_CHANGE`, then the config's `on_change` key, then the
/// built-in pipeline.
///
/// A configured handler path that does not exist on disk is
/// `HandlerNotFound`, fatal at startup.
pub fn resolve_handler(
    cli_path: Option<&str>,
    config: &ConfigFile,
    root: &Path,
    callback: Option<ChangeCallback>,
) -> Result<OnChange> {
    if let Some(callback) = callback {
        return Ok(OnChange::Callback(callback));
    }

    let env_path = std::env::var("DIRMIRROR_ON_CHANGE").ok();
    let configured = cli_path
        .map(str::to_string)
        .or(env_path)
        .or_else(|| config.on_change.clone());

    match configured {
        Some(raw) => {
            let path = resolve_path(root, &raw);
            if !path.exists() {
                return Err(DirmirrorError::HandlerNotFound(path));
            }
            info!(handler = %path.display(), "using external on-change handler");
            Ok(OnChange::Command(path))
        }
        None => Ok(OnChange::Pipeline),
    }
}

/// Run the external on-change handler for one event.
///
/// The handler is invoked as `<program> <event-kind> <absolute-path>`; a
/// non-zero exit status is treated like any other propagation failure.
pub async fn run_handler_command(program: &Path, kind: &EventKind, path: &Path) -> Result<()> {
    let status = Command::new(program)
        .arg(event_label(kind))
        .arg(path)
        .status()
        .await
        .with_context(|| format!("spawning on-change handler {:?}", program))?;

    if !status.success() {
        return Err(anyhow!(
            "on-change handler {:?} exited with status {}",
            program,
            status.code().unwrap_or(-1)
        )
        .into());
    }

    Ok(())
}

/// Stable string label for a raw event kind, as passed to external handlers.
pub fn event_label(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Create(_) => "added",
        EventKind::Modify(_) => "updated",
        EventKind::Remove(_) => "removed",
        EventKind::Access(_) => "accessed",
        _ => "other",
    }
}
