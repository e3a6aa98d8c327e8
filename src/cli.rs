// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dirmirror`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dirmirror",
    version,
    about = "Mirror a source directory to one or more destinations and keep all of them in sync.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML or JSON).
    ///
    /// If omitted, `DIRMIRROR_CONFIG` is consulted, then `Dirmirror.toml` in
    /// the current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Source directory for a single ad-hoc mirror group.
    ///
    /// Used together with `--dest`; takes the place of a config file.
    /// Falls back to `DIRMIRROR_SRC`.
    #[arg(long, value_name = "PATH")]
    pub src: Option<String>,

    /// Destination directory for the ad-hoc mirror group (repeatable).
    ///
    /// Falls back to `DIRMIRROR_DEST`.
    #[arg(long, value_name = "PATH")]
    pub dest: Vec<String>,

    /// Debounce window in milliseconds between re-syncs of the same group.
    ///
    /// Overrides the config file and `DIRMIRROR_SYNC_TIMEOUT`. Default: 1000.
    #[arg(long, value_name = "MS")]
    pub sync_timeout: Option<u64>,

    /// Perform the initial sync only, without watching for changes.
    #[arg(long)]
    pub no_watch: bool,

    /// Path to an executable invoked on every change instead of the built-in
    /// propagation pipeline.
    ///
    /// Falls back to `DIRMIRROR_ON_CHANGE`, then the config's `on_change` key.
    #[arg(long, value_name = "PATH")]
    pub on_change: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DIRMIRROR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
