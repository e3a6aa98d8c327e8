// src/sync/classify.rs

use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, EventKind};

use crate::sync::registry::Registry;

/// What a raw filesystem event means for the mirror group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A file or directory was deleted; delete it under every other member.
    Removed,
    /// A file or directory was created or modified; copy it over every other
    /// member.
    Updated,
    /// Fallback for event kinds not explicitly handled: copy the whole
    /// triggering member tree over every other member.
    FullResync,
}

/// A raw changed path resolved back to its mirror group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedChange {
    /// Group key (anchor path) the change belongs to.
    pub anchor: PathBuf,
    /// The member (anchor or destination) under which the change was seen.
    pub triggering_member: PathBuf,
    /// Changed path relative to the triggering member; empty means the member
    /// root itself changed.
    pub relative_path: PathBuf,
    pub kind: ChangeKind,
}

/// Map a raw `notify` event kind onto a [`ChangeKind`].
///
/// Returns `None` for pure access notifications other than close-after-write,
/// which are read noise a chokidar-style watcher would never surface.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Create(_) | EventKind::Modify(_) => Some(ChangeKind::Updated),
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => Some(ChangeKind::Updated),
        EventKind::Access(_) => None,
        _ => Some(ChangeKind::FullResync),
    }
}

/// Resolve an absolute changed path to its mirror group.
///
/// Resolution order (first match wins):
/// 1. prefix match against anchors — the anchor is the triggering member;
/// 2. prefix match against destinations — the matched destination is the
///    triggering member, its owner the anchor;
/// 3. no match: the path is outside every managed group and the event is
///    dropped by the caller.
pub fn classify(registry: &Registry, path: &Path, kind: ChangeKind) -> Option<ClassifiedChange> {
    for (anchor, _group) in registry.src_map() {
        if let Ok(rel) = path.strip_prefix(anchor) {
            return Some(ClassifiedChange {
                anchor: anchor.clone(),
                triggering_member: anchor.clone(),
                relative_path: rel.to_path_buf(),
                kind,
            });
        }
    }

    for (dest, anchor) in registry.dir_map() {
        if let Ok(rel) = path.strip_prefix(dest) {
            return Some(ClassifiedChange {
                anchor: anchor.clone(),
                triggering_member: dest.clone(),
                relative_path: rel.to_path_buf(),
                kind,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn remove_kinds_map_to_removed() {
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Removed)
        );
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::Folder)),
            Some(ChangeKind::Removed)
        );
    }

    #[test]
    fn create_and_modify_map_to_updated() {
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Updated)
        );
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::Folder)),
            Some(ChangeKind::Updated)
        );
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Updated)
        );
    }

    #[test]
    fn unhandled_kinds_fall_back_to_full_resync() {
        assert_eq!(change_kind(&EventKind::Any), Some(ChangeKind::FullResync));
        assert_eq!(
            change_kind(&EventKind::Other),
            Some(ChangeKind::FullResync)
        );
    }

    #[test]
    fn plain_access_events_are_dropped() {
        assert_eq!(change_kind(&EventKind::Access(AccessKind::Read)), None);
        assert_eq!(
            change_kind(&EventKind::Access(AccessKind::Close(AccessMode::Write))),
            Some(ChangeKind::Updated)
        );
    }
}
