// src/watch/mod.rs

//! File watching and glob matching.
//!
//! This module is responsible for:
//! - Compiling resolved `watch_on` globs (with `!` negation) per descriptor.
//! - Expanding globs into concrete input files for transformers.
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns
//!   changes into per-descriptor triggers.
//!
//! It does **not** know what a trigger does; the caller supplies the
//! callback.

pub mod patterns;
pub mod watcher;

pub use patterns::{collect_matching_files, MatchedFile, WatchPattern};
pub use watcher::{spawn_event_loop, watch_all, OnTrigger, WatchEntry, WatchHandle, WatchRouter};
