// src/engine/mod.rs

//! Watch-mode engine for jazzhands.
//!
//! The watch loop cycles `Idle -> Checking -> Rebuilding -> Idle` forever:
//! sleep, poll the watch table, rebuild whatever changed.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell that
//! sleeps, polls and drives the pipeline is implemented in [`runtime`].

use crate::types::Lang;
use crate::watch::ChangeSet;

/// Where the watch loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchPhase {
    /// Sleeping until the next poll.
    #[default]
    Idle,
    /// Comparing the watch table against the filesystem.
    Checking,
    /// Collecting and building changed families.
    Rebuilding,
}

/// Events flowing into the core.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A poll finished with these changes (possibly none).
    Polled(ChangeSet),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Which languages the project can rebuild at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildPlan {
    pub less: bool,
    pub styl: bool,
    pub js: bool,
}

impl BuildPlan {
    pub fn can_build(&self, lang: Lang) -> bool {
        match lang {
            Lang::Js => self.js,
            Lang::Less => self.less,
            Lang::Styl => self.styl,
        }
    }

    pub fn has_stylesheets(&self) -> bool {
        self.less || self.styl
    }
}

pub mod core;
pub mod runtime;

pub use core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::Runtime;
