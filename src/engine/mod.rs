// src/engine/mod.rs

//! Event-loop engine for dirmirror.
//!
//! All raw filesystem events funnel through one mpsc channel into a single
//! consumer loop, which classifies each change and dispatches it through the
//! configured on-change handler. Having exactly one consumer gives a single
//! well-defined point where per-group serialization could be added later;
//! today propagations are spawned without awaiting, preserving the advisory
//! debounce semantics.

pub mod runtime;

pub use runtime::{Runtime, RuntimeEvent, RuntimeOptions};
