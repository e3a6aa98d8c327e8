// src/config/validate.rs

use crate::config::model::{ConfigFile, DirsEntry, RESERVED_GROUP_KEYS};
use crate::errors::{DirmirrorError, Result};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks that every non-reserved `dirs` entry:
/// - is actually a group (has `src` and `dest`), not a stray scalar;
/// - has a non-empty `src`;
/// - has at least one usable destination path.
///
/// It does **not** check that the paths exist on disk; that happens in the
/// group builder, where a missing source is `SourceNotFound`.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    for (name, entry) in cfg.dirs.iter() {
        if RESERVED_GROUP_KEYS.contains(&name.as_str()) {
            continue;
        }

        let group = match entry {
            DirsEntry::Group(group) => group,
            DirsEntry::Setting(value) => {
                return Err(DirmirrorError::ConfigInvalid(format!(
                    "dirs entry '{name}' is not a mirror group (expected `src` and `dest`, got {value})"
                )));
            }
        };

        if group.src.trim().is_empty() {
            return Err(DirmirrorError::ConfigInvalid(format!(
                "dirs entry '{name}' has an empty `src`"
            )));
        }

        if group.dest.paths().iter().all(|p| p.trim().is_empty()) {
            return Err(DirmirrorError::ConfigInvalid(format!(
                "dirs entry '{name}' has no usable `dest` path"
            )));
        }
    }

    Ok(())
}
