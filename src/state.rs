// src/state.rs

//! Process-local state shared by collection, build and the watch loop.

use std::path::PathBuf;

use crate::discover::{AssetRegistry, EntryPoints, OutputDirs, ProjectLayout};
use crate::errors::{JazzhandsError, Result};
use crate::types::{AssetFamily, Lang, StylesheetMode};
use crate::watch::WatchTable;

/// Everything discovery learned about the project, threaded explicitly
/// through every stage. Nothing is persisted between runs.
#[derive(Debug, Clone)]
pub struct ProjectState {
    pub layout: ProjectLayout,
    pub entries: EntryPoints,
    pub outputs: OutputDirs,
    pub registry: AssetRegistry,
    pub watch: WatchTable,
}

impl ProjectState {
    /// A language is buildable when it has an entry file and its family has
    /// somewhere to write the bundle.
    pub fn is_buildable(&self, lang: Lang) -> bool {
        self.entries.has(lang) && self.outputs.get(lang.family()).is_some()
    }

    pub fn has_stylesheets(&self) -> bool {
        self.entries.has(Lang::Less) || self.entries.has(Lang::Styl)
    }

    pub fn bundle_path(&self, family: AssetFamily) -> Option<PathBuf> {
        self.outputs.bundle_path(family)
    }

    /// Reject projects mixing Less and Stylus when the mode forbids it.
    pub fn check_stylesheet_mode(&self, mode: StylesheetMode) -> Result<()> {
        if mode == StylesheetMode::Exclusive && self.entries.has(Lang::Less) && self.entries.has(Lang::Styl) {
            return Err(JazzhandsError::MixedStylesheets);
        }
        Ok(())
    }
}
