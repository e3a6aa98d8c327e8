// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::{DirmirrorError, Result};

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// The format is chosen by extension: `.json` is parsed with `serde_json`,
/// anything else as TOML. This only performs deserialization; it does **not**
/// perform semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading config file");

    let contents = fs::read_to_string(path).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            DirmirrorError::ConfigNotFound(path.display().to_string())
        } else {
            DirmirrorError::IoFailure(err)
        }
    })?;

    let config = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&contents)?
    } else {
        toml::from_str(&contents)?
    };

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML or JSON.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks that every non-reserved `dirs` entry is a well-formed group.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Default config path: `Dirmirror.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dirmirror.toml")
}
