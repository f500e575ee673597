// src/watch/mod.rs

//! Polling change detection.
//!
//! This module is responsible for:
//! - Keeping the watch table: last seen modification time per source file.
//! - Compiling `[watch].exclude` glob patterns.
//! - Turning a poll of the filesystem into a set of changed languages.
//!
//! It does **not** know how to rebuild anything; the engine decides that.

pub mod path_utils;
pub mod patterns;
pub mod table;

pub use patterns::ExcludeSet;
pub use table::{ChangeSet, WatchTable};
