// src/sync/registry.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// One mirror group: an anchor (source) directory plus the destinations kept
/// in sync with it.
///
/// `members[0]` is always the anchor. The member list is structural state,
/// fixed once the group is built; the debounce timestamp is the only field
/// that changes afterwards, so it is an atomic and the group can be shared
/// immutably across tasks without a lock.
#[derive(Debug)]
pub struct MirrorGroup {
    anchor: PathBuf,
    members: Vec<PathBuf>,
    last_synced_ms: AtomicU64,
}

impl MirrorGroup {
    fn new(anchor: PathBuf) -> Self {
        Self {
            members: vec![anchor.clone()],
            anchor,
            last_synced_ms: AtomicU64::new(0),
        }
    }

    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// All member paths, anchor first.
    pub fn members(&self) -> &[PathBuf] {
        &self.members
    }

    /// Destination paths only.
    pub fn destinations(&self) -> &[PathBuf] {
        &self.members[1..]
    }

    /// Wall-clock milliseconds of the most recent successful propagation
    /// originating from this group (0 = never synced).
    pub fn last_synced_ms(&self) -> u64 {
        self.last_synced_ms.load(Ordering::Acquire)
    }

    /// Record a sync at the given wall-clock time.
    ///
    /// Called once at initial-copy completion and then by the propagation
    /// executor *before* dispatching, so a multi-target propagation in flight
    /// already re-arms the debounce window.
    pub fn mark_synced(&self, now_ms: u64) {
        self.last_synced_ms.store(now_ms, Ordering::Release);
    }
}

/// Process-wide mirror-group state.
///
/// Structural mutation only happens up front, through the group builder; once
/// watching starts the registry is shared as `Arc<Registry>` and only read
/// (plus per-group timestamp updates). It is never persisted and has no
/// group-deletion API; groups live for the process lifetime.
#[derive(Debug, Default)]
pub struct Registry {
    /// Anchor path -> group (members include the anchor as element 0).
    src_map: BTreeMap<PathBuf, MirrorGroup>,
    /// Destination path -> owning anchor path.
    dir_map: BTreeMap<PathBuf, PathBuf>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.src_map.is_empty()
    }

    pub fn contains_anchor(&self, path: &Path) -> bool {
        self.src_map.contains_key(path)
    }

    /// The anchor owning `dest`, if any group has claimed it.
    pub fn owner_of(&self, dest: &Path) -> Option<&Path> {
        self.dir_map.get(dest).map(PathBuf::as_path)
    }

    pub fn group(&self, anchor: &Path) -> Option<&MirrorGroup> {
        self.src_map.get(anchor)
    }

    pub fn groups(&self) -> impl Iterator<Item = &MirrorGroup> {
        self.src_map.values()
    }

    pub fn src_map(&self) -> &BTreeMap<PathBuf, MirrorGroup> {
        &self.src_map
    }

    pub fn dir_map(&self) -> &BTreeMap<PathBuf, PathBuf> {
        &self.dir_map
    }

    /// Whether `dest` may still be claimed as a destination: it must not be
    /// owned by any group already and must not be an anchor itself.
    pub fn can_claim(&self, dest: &Path) -> bool {
        !self.dir_map.contains_key(dest) && !self.src_map.contains_key(dest)
    }

    /// Create an empty group for `anchor` if one does not exist yet.
    pub(crate) fn register_anchor(&mut self, anchor: PathBuf) {
        self.src_map
            .entry(anchor.clone())
            .or_insert_with(|| MirrorGroup::new(anchor));
    }

    /// Claim `dest` for the group owned by `anchor`.
    ///
    /// Returns `false` (and changes nothing) if the destination is already
    /// owned elsewhere or is itself an anchor; an existing owner is never
    /// silently overwritten.
    pub(crate) fn register_destination(&mut self, anchor: &Path, dest: PathBuf) -> bool {
        if !self.can_claim(&dest) {
            return false;
        }
        let Some(group) = self.src_map.get_mut(anchor) else {
            return false;
        };
        self.dir_map.insert(dest.clone(), anchor.to_path_buf());
        group.members.push(dest);
        true
    }
}

/// Current wall-clock time in milliseconds since the epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
