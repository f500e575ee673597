// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::watch::path_utils::{relative_str, slash_str};

/// Compiled `[watch].exclude` patterns.
///
/// Patterns are matched against the path relative to the workspace root and
/// against the full path, so both `app/static/js/vendor/**` and
/// `**/*bundle.js` work.
#[derive(Clone)]
pub struct ExcludeSet {
    root: PathBuf,
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("root", &self.root)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeSet {
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }
        let set = builder.build().context("building watch exclude globset")?;

        Ok(Self {
            root: root.into(),
            patterns: patterns.to_vec(),
            set,
        })
    }

    /// A set that excludes nothing.
    pub fn empty() -> Self {
        Self {
            root: PathBuf::new(),
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        if let Some(rel) = relative_str(&self.root, path) {
            if self.set.is_match(&rel) {
                return true;
            }
        }
        self.set.is_match(slash_str(path))
    }
}
