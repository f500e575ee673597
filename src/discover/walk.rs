// src/discover/walk.rs

//! Deterministic directory traversal over a [`FileSystem`].
//!
//! Directory listings are sorted before use, so "first match wins" decisions
//! made by callers depend only on path names, never on the order the
//! platform happens to list entries in.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;

/// One visited directory and the files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub dir: PathBuf,
    /// Full paths, sorted.
    pub files: Vec<PathBuf>,
}

impl DirListing {
    /// Whether the directory directly contains a file called `name`.
    pub fn has_file(&self, name: &str) -> bool {
        self.files
            .iter()
            .any(|f| f.file_name().is_some_and(|n| n == name))
    }
}

/// Walk `root` depth-first, pre-order, visiting siblings in lexicographic
/// order.
///
/// - `follow_links`: descend into symlinked directories. Each canonical
///   directory is visited at most once so link cycles terminate.
/// - `prune`: directories for which this returns true are neither visited nor
///   descended into. `root` itself is never pruned.
///
/// Unreadable directories are skipped with a warning.
pub fn walk_dirs<F>(fs: &dyn FileSystem, root: &Path, follow_links: bool, prune: F) -> Vec<DirListing>
where
    F: Fn(&Path) -> bool,
{
    let mut out = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if follow_links {
            let canonical = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !seen.insert(canonical) {
                debug!(?dir, "directory already visited through another link");
                continue;
            }
        }

        let mut entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(?dir, error = %err, "skipping unreadable directory");
                continue;
            }
        };
        entries.sort();

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries {
            if fs.is_dir(&entry) {
                if !follow_links && fs.is_symlink(&entry) {
                    continue;
                }
                if !prune(&entry) {
                    subdirs.push(entry);
                }
            } else if fs.is_file(&entry) {
                files.push(entry);
            }
        }

        // Reverse so the lexicographically first child is popped first.
        stack.extend(subdirs.into_iter().rev());
        out.push(DirListing { dir, files });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn visits_in_lexicographic_preorder() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/b/x.js", "");
        fs.add_file("/w/a/z/y.js", "");
        fs.add_file("/w/a/y.js", "");

        let dirs: Vec<PathBuf> = walk_dirs(&fs, Path::new("/w"), false, |_| false)
            .into_iter()
            .map(|l| l.dir)
            .collect();

        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/w"),
                PathBuf::from("/w/a"),
                PathBuf::from("/w/a/z"),
                PathBuf::from("/w/b"),
            ]
        );
    }

    #[test]
    fn pruned_directories_are_not_entered() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/node_modules/pkg/index.js", "");
        fs.add_file("/w/src/index.js", "");

        let listings = walk_dirs(&fs, Path::new("/w"), false, |p| {
            p.file_name().is_some_and(|n| n == "node_modules")
        });

        assert!(listings.iter().all(|l| !l.dir.starts_with("/w/node_modules")));
        assert!(listings.iter().any(|l| l.has_file("index.js")));
    }
}
