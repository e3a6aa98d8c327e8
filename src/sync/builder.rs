// src/sync/builder.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::errors::{DirmirrorError, Result};
use crate::sync::fsops;
use crate::sync::registry::{now_ms, Registry};

/// Build every mirror group named in the config, in order.
///
/// Reserved keys and non-group entries under `dirs` have already been
/// filtered by `ConfigFile::groups()`. Any copy failure aborts the whole
/// build; the caller decides whether that terminates the process.
pub async fn build_all(registry: &mut Registry, root: &Path, config: &ConfigFile) -> Result<()> {
    for (name, group) in config.groups() {
        info!(group = %name, src = %group.src, "building mirror group");
        build_group(registry, root, &group.src, &group.dest.paths()).await?;
    }
    Ok(())
}

/// Build a single mirror group: validate the source, normalize and claim the
/// destinations, perform the initial full copy to each, and register
/// everything in the registry.
///
/// - The source must exist on disk (`SourceNotFound` otherwise).
/// - An anchor that is already registered is a no-op: groups are never
///   rebuilt or merged.
/// - A destination already owned by another group (or equal to an anchor) is
///   skipped with a warning, never re-claimed.
/// - The group's debounce timestamp is set once all initial copies complete.
pub async fn build_group(
    registry: &mut Registry,
    root: &Path,
    src: &str,
    dests: &[String],
) -> Result<()> {
    let anchor = resolve_path(root, src);

    // Groups are built exactly once; a second registration is a no-op.
    if registry.contains_anchor(&anchor) {
        return Ok(());
    }

    if !fsops::exists(&anchor).await {
        return Err(DirmirrorError::SourceNotFound(anchor));
    }

    let dest_paths = normalize_dests(root, dests);

    registry.register_anchor(anchor.clone());

    for dest in dest_paths {
        if !registry.can_claim(&dest) {
            warn!(
                dest = %dest.display(),
                anchor = %anchor.display(),
                "destination already claimed by another group, skipping"
            );
            continue;
        }

        fsops::copy_recursive(&anchor, &dest).await?;
        registry.register_destination(&anchor, dest.clone());
        info!(
            src = %anchor.display(),
            dest = %dest.display(),
            "destination synced from source"
        );
    }

    if let Some(group) = registry.group(&anchor) {
        group.mark_synced(now_ms());
    }

    Ok(())
}

/// Drop empty entries, resolve each destination against the config root, and
/// de-duplicate while preserving order.
fn normalize_dests(root: &Path, dests: &[String]) -> Vec<PathBuf> {
    let mut resolved: Vec<PathBuf> = Vec::with_capacity(dests.len());
    for dest in dests {
        if dest.trim().is_empty() {
            continue;
        }
        let path = resolve_path(root, dest);
        if !resolved.contains(&path) {
            resolved.push(path);
        }
    }
    resolved
}

/// Resolve a config path against the config file's directory unless it is
/// already absolute.
pub(crate) fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
