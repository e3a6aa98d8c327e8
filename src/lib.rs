// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handler;
pub mod logging;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::{ConfigFile, DestSpec, DirsEntry, GroupConfig};
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::{DirmirrorError, Result};
use crate::handler::{resolve_handler, ChangeCallback};
use crate::sync::{build_all, Registry};
use crate::watch::start_watching;

/// Debounce window applied when neither the CLI, the config, nor
/// `DIRMIRROR_SYNC_TIMEOUT` specifies one.
pub const DEFAULT_SYNC_TIMEOUT_MS: u64 = 1000;

/// High-level entry point used by `main.rs` and by library embedders.
///
/// This wires together:
/// - config resolution (file, or an ad-hoc group from `--src`/`--dest`)
/// - the group builder (initial full copy into every destination)
/// - one filesystem watcher per mirror group
/// - the event loop, with INT/TERM handling
///
/// `on_change` replaces the built-in classify + propagate pipeline for
/// embedders that want to observe changes themselves.
///
/// Any unrecoverable error is logged with the sync-error banner, watches are
/// stopped, and the error is returned; the CLI turns that into a non-zero
/// exit.
pub async fn run_sync(args: CliArgs, on_change: Option<ChangeCallback>) -> Result<()> {
    match run_sync_inner(args, on_change).await {
        Ok(()) => Ok(()),
        Err(err) => {
            logging::log_fatal(&err);
            Err(err)
        }
    }
}

async fn run_sync_inner(args: CliArgs, on_change: Option<ChangeCallback>) -> Result<()> {
    let (config, root) = resolve_config(&args)?;

    let sync_timeout_ms = resolve_sync_timeout(&args, &config);
    let watch_enabled = resolve_watch(&args, &config);
    let handler = resolve_handler(args.on_change.as_deref(), &config, &root, on_change)?;

    // Initial sync: build every group up front, before any watch starts.
    let mut registry = Registry::new();
    build_all(&mut registry, &root, &config).await?;

    if registry.is_empty() {
        return Err(DirmirrorError::ConfigInvalid(
            "config contains no mirror groups".to_string(),
        ));
    }

    info!(sync_timeout_ms, watch = watch_enabled, "initial sync complete");

    if !watch_enabled {
        return Ok(());
    }

    let registry = Arc::new(registry);

    // Runtime event channel: watchers and the signal handler both feed it.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let mut watches = start_watching(&registry, rt_tx.clone())?;

    spawn_signal_listener(rt_tx.clone());

    let options = RuntimeOptions { sync_timeout_ms };
    let runtime = Runtime::new(Arc::clone(&registry), handler, options, rt_rx, rt_tx);
    let result = runtime.run().await;

    watches.stop();
    result
}

/// Resolve the configuration and the root directory paths are relative to.
///
/// Priority:
/// 1. `--config` / `DIRMIRROR_CONFIG`: load that file; root is its directory.
/// 2. `--src` + `--dest` (or `DIRMIRROR_SRC` / `DIRMIRROR_DEST`): a single
///    ad-hoc group rooted at the current working directory.
/// 3. `Dirmirror.toml` in the current working directory.
fn resolve_config(args: &CliArgs) -> Result<(ConfigFile, PathBuf)> {
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("DIRMIRROR_CONFIG").ok());

    if let Some(path) = config_path {
        let path = PathBuf::from(path);
        let config = load_and_validate(&path)?;
        return Ok((config, config_root_dir(&path)));
    }

    let src = args
        .src
        .clone()
        .or_else(|| std::env::var("DIRMIRROR_SRC").ok());
    let mut dests = args.dest.clone();
    if dests.is_empty() {
        if let Ok(dest) = std::env::var("DIRMIRROR_DEST") {
            dests.push(dest);
        }
    }

    if let Some(src) = src {
        if dests.is_empty() {
            return Err(DirmirrorError::ConfigInvalid(
                "--src given without any --dest".to_string(),
            ));
        }
        let mut config = ConfigFile::default();
        config.dirs.insert(
            "cli".to_string(),
            DirsEntry::Group(GroupConfig {
                src,
                dest: DestSpec::Many(dests.into_iter().map(serde_json::Value::String).collect()),
            }),
        );
        let root = std::env::current_dir()?;
        return Ok((config, root));
    }

    let path = default_config_path();
    match load_and_validate(&path) {
        Ok(config) => Ok((config, config_root_dir(&path))),
        Err(DirmirrorError::ConfigNotFound(_)) => Err(DirmirrorError::ConfigNotFound(
            "pass --config or --src/--dest, or set DIRMIRROR_CONFIG or \
             DIRMIRROR_SRC and DIRMIRROR_DEST"
                .to_string(),
        )),
        Err(err) => Err(err),
    }
}

/// Directory containing the config file, or `.`; relative `src`/`dest`
/// entries are resolved against it.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// CLI flag, then config, then `DIRMIRROR_SYNC_TIMEOUT`, then the default.
fn resolve_sync_timeout(args: &CliArgs, config: &ConfigFile) -> u64 {
    args.sync_timeout
        .or(config.sync_timeout)
        .or_else(|| {
            std::env::var("DIRMIRROR_SYNC_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(DEFAULT_SYNC_TIMEOUT_MS)
}

/// Watching is on by default; `--no-watch`, `watch = false` in the config,
/// and `DIRMIRROR_WATCH=false` each turn it off.
fn resolve_watch(args: &CliArgs, config: &ConfigFile) -> bool {
    if args.no_watch || config.watch == Some(false) {
        return false;
    }
    std::env::var("DIRMIRROR_WATCH").map(|v| v != "false").unwrap_or(true)
}

/// INT/TERM -> graceful shutdown of the event loop.
fn spawn_signal_listener(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            eprintln!("failed to listen for SIGTERM: {err}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {err}");
    }
}
