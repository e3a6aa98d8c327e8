// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Keys inside `dirs` that are settings overrides, never group names.
pub const RESERVED_GROUP_KEYS: &[&str] = &["watch", "on_change", "sync_timeout", "syncTimeout"];

/// Top-level configuration as read from a TOML or JSON file.
///
/// TOML form:
///
/// ```toml
/// watch = true
/// sync_timeout = 1000
///
/// [dirs.components]
/// src = "./components"
/// dest = ["../web/components", "../admin/components"]
/// ```
///
/// JSON form:
///
/// ```json
/// { "dirs": { "components": { "src": "./components", "dest": "../web/components" } } }
/// ```
///
/// All sections are optional at parse time; semantic checks live in
/// `validate.rs` and in the group builder.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Mirror groups from `dirs.<name>`: each entry names a source directory
    /// and one or more destinations to keep in sync with it.
    #[serde(default)]
    pub dirs: BTreeMap<String, DirsEntry>,

    /// Whether to keep watching for changes after the initial sync.
    ///
    /// Defaults to `true`; the `--no-watch` flag and `DIRMIRROR_WATCH=false`
    /// both override it.
    #[serde(default)]
    pub watch: Option<bool>,

    /// Debounce window in milliseconds between re-syncs of the same group.
    #[serde(default, alias = "syncTimeout")]
    pub sync_timeout: Option<u64>,

    /// Path to an executable invoked on every change instead of the built-in
    /// propagation pipeline.
    #[serde(default)]
    pub on_change: Option<String>,
}

/// One entry under `dirs`.
///
/// Reserved keys (`watch`, `on_change`, `sync_timeout`) may legitimately
/// appear inside `dirs` as per-section overrides; they parse into `Setting`
/// and are skipped when groups are built. Anything else must be a group.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DirsEntry {
    Group(GroupConfig),
    Setting(serde_json::Value),
}

/// A single mirror group: `src` plus one or more `dest` paths.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    /// Source (anchor) directory, relative to the config file's directory
    /// unless absolute.
    pub src: String,

    /// Destination directory or list of directories.
    pub dest: DestSpec,
}

/// `dest` accepts either a single path or an array of paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DestSpec {
    One(String),
    Many(Vec<serde_json::Value>),
}

impl DestSpec {
    /// Flatten to the list of destination path strings.
    ///
    /// Non-string array entries are dropped rather than rejected, matching
    /// the builder's "drop non-path entries" normalization.
    pub fn paths(&self) -> Vec<String> {
        match self {
            DestSpec::One(p) => vec![p.clone()],
            DestSpec::Many(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        }
    }
}

impl ConfigFile {
    /// Iterate the real mirror groups, skipping reserved setting keys.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupConfig)> {
        self.dirs.iter().filter_map(|(name, entry)| {
            if RESERVED_GROUP_KEYS.contains(&name.as_str()) {
                return None;
            }
            match entry {
                DirsEntry::Group(group) => Some((name.as_str(), group)),
                DirsEntry::Setting(_) => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_as_single_string_and_array_both_parse() {
        let toml_cfg: ConfigFile = toml::from_str(
            r#"
            [dirs.a]
            src = "./a"
            dest = "./b"

            [dirs.c]
            src = "./c"
            dest = ["./d", "./e"]
            "#,
        )
        .unwrap();

        let groups: Vec<_> = toml_cfg.groups().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.dest.paths(), vec!["./b"]);
        assert_eq!(groups[1].1.dest.paths(), vec!["./d", "./e"]);
    }

    #[test]
    fn reserved_keys_inside_dirs_are_not_groups() {
        let cfg: ConfigFile = serde_json::from_str(
            r#"{
                "dirs": {
                    "watch": false,
                    "sync_timeout": 2000,
                    "components": { "src": "./components", "dest": "../web/components" }
                }
            }"#,
        )
        .unwrap();

        let names: Vec<_> = cfg.groups().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["components"]);
    }

    #[test]
    fn non_string_dest_entries_are_dropped() {
        let cfg: ConfigFile = serde_json::from_str(
            r#"{ "dirs": { "a": { "src": "./a", "dest": ["./b", 42, null, "./c"] } } }"#,
        )
        .unwrap();

        let (_, group) = cfg.groups().next().unwrap();
        assert_eq!(group.dest.paths(), vec!["./b", "./c"]);
    }

    #[test]
    fn top_level_overrides_parse_with_camel_case_alias() {
        let cfg: ConfigFile = serde_json::from_str(
            r#"{ "dirs": {}, "watch": false, "syncTimeout": 250, "on_change": "./hook.sh" }"#,
        )
        .unwrap();

        assert_eq!(cfg.watch, Some(false));
        assert_eq!(cfg.sync_timeout, Some(250));
        assert_eq!(cfg.on_change.as_deref(), Some("./hook.sh"));
    }
}
