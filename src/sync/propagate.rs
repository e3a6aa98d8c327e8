// src/sync/propagate.rs

use std::path::PathBuf;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::errors::{DirmirrorError, Result};
use crate::sync::classify::{ChangeKind, ClassifiedChange};
use crate::sync::fsops;
use crate::sync::registry::{now_ms, MirrorGroup};

/// Apply one classified change to every group member except the one that
/// triggered it.
///
/// Debounce: if less than `sync_timeout_ms` has passed since the group's last
/// successful propagation, the event is dropped with no filesystem operation
/// and no state change. This is a global per-group cool-down, not a per-file
/// one, so a burst of unrelated changes inside the window is entirely
/// suppressed. The timestamp is re-armed *before* dispatching; the check is
/// advisory, not a mutex, and overlapping events for the same group are not
/// serialized.
///
/// All target dispatches run concurrently and are joined before the event is
/// considered done; the first failure is fatal to the whole event, with no
/// rollback of targets that already completed.
pub async fn propagate(
    group: &MirrorGroup,
    change: &ClassifiedChange,
    sync_timeout_ms: u64,
) -> Result<()> {
    let now = now_ms();
    if now.saturating_sub(group.last_synced_ms()) < sync_timeout_ms {
        debug!(
            anchor = %group.anchor().display(),
            path = %change.relative_path.display(),
            "within debounce window, dropping event"
        );
        return Ok(());
    }

    let targets: Vec<PathBuf> = group
        .members()
        .iter()
        .filter(|member| **member != change.triggering_member)
        .cloned()
        .collect();

    if targets.is_empty() {
        return Ok(());
    }

    group.mark_synced(now);

    match change.kind {
        ChangeKind::Removed => info!(
            member = %change.triggering_member.display(),
            path = %change.relative_path.display(),
            "syncing members for remove event"
        ),
        ChangeKind::Updated => info!(
            member = %change.triggering_member.display(),
            path = %change.relative_path.display(),
            "syncing members for update event"
        ),
        ChangeKind::FullResync => info!(
            member = %change.triggering_member.display(),
            "re-syncing members from triggering member"
        ),
    }

    let mut dispatches = JoinSet::new();
    for target in targets {
        let trigger = change.triggering_member.clone();
        let rel = change.relative_path.clone();
        let kind = change.kind;

        dispatches.spawn(async move {
            match kind {
                ChangeKind::Removed => fsops::remove(&target.join(&rel)).await,
                ChangeKind::Updated => {
                    fsops::copy_recursive(&trigger.join(&rel), &target.join(&rel)).await
                }
                ChangeKind::FullResync => fsops::copy_recursive(&trigger, &target).await,
            }
        });
    }

    // Let every dispatch settle, then surface the first failure.
    let mut first_err: Option<DirmirrorError> = None;
    while let Some(joined) = dispatches.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_err.is_none() {
                    first_err = Some(err.into());
                }
            }
            Err(join_err) => {
                if first_err.is_none() {
                    first_err = Some(anyhow!(join_err).into());
                }
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
