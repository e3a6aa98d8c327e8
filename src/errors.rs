// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Configuration and validation failures are fatal at startup; `IoFailure`
//! during the initial copy or during event propagation is fatal to the whole
//! process (watches are stopped, nothing is retried or isolated per group).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirmirrorError {
    #[error("Config not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Source dir does not exist at: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("Can not find on-change handler at: {}", .0.display())]
    HandlerNotFound(PathBuf),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DirmirrorError>;
