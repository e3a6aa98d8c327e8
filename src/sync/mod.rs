// src/sync/mod.rs

//! Mirror-group synchronization core.
//!
//! - [`registry`] owns the anchor -> members and destination -> anchor maps.
//! - [`builder`] validates sources, performs the initial full copy, and
//!   populates the registry.
//! - [`classify`] maps a raw changed path back to (group, member, relative path).
//! - [`propagate`] applies the change to every other group member, behind the
//!   per-group debounce window.
//! - [`fsops`] is the thin async filesystem layer (recursive copy with
//!   clobber semantics, tolerant recursive delete, existence check).
//!
//! This module knows nothing about `notify` or the CLI; raw events reach it
//! already reduced to a [`classify::ChangeKind`] and an absolute path.

pub mod builder;
pub mod classify;
pub mod fsops;
pub mod propagate;
pub mod registry;

pub use builder::{build_all, build_group};
pub use classify::{classify, ChangeKind, ClassifiedChange};
pub use propagate::propagate;
pub use registry::{MirrorGroup, Registry};
