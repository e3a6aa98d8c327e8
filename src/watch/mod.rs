// src/watch/mod.rs

//! Filesystem watch lifecycle.
//!
//! This module is responsible for:
//! - Creating one cross-platform watcher (`notify`) per mirror group,
//!   subscribed to the anchor *and* every destination, which is what makes
//!   propagation bidirectional.
//! - Gating event delivery on readiness, so a watcher's own setup never
//!   looks like a change.
//! - Tearing every watch down on shutdown or fatal error.
//!
//! It does **not** know about debounce or copy semantics; it only turns raw
//! filesystem events into runtime events.

pub mod watcher;

pub use watcher::{start_watching, WatchSet};
