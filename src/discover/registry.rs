// src/discover/registry.rs

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::discover::locator::ProjectLayout;
use crate::discover::walk::walk_dirs;
use crate::fs::FileSystem;
use crate::types::Lang;

/// An installed package's asset directory for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageAssets {
    /// Package name: the basename of the directory that owns `static/`.
    pub name: String,
    /// `<package>/static/<lang dir>`
    pub source_dir: PathBuf,
}

/// External assets discovered in installed packages, per language, in
/// discovery order.
///
/// Package names are not deduplicated: two packages called `widgets` in
/// different search paths produce two entries, and whichever is collected
/// last ends up at the destination.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    by_lang: BTreeMap<Lang, Vec<PackageAssets>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, lang: Lang, assets: PackageAssets) {
        self.by_lang.entry(lang).or_default().push(assets);
    }

    /// Entries for `lang`; empty when nothing was discovered.
    pub fn packages(&self, lang: Lang) -> &[PackageAssets] {
        self.by_lang.get(&lang).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_lang.values().all(Vec::is_empty)
    }

    /// Walk every search path looking for asset markers.
    ///
    /// - Directories named in `exclude_dirs` are pruned.
    /// - The project's own package is skipped entirely.
    /// - Directories inside a Python standard library (`lib/python...` but not
    ///   `site-packages`) are descended into but never recorded.
    /// - A marker reachable through two search paths is recorded once.
    pub fn discover(
        fs: &dyn FileSystem,
        search_paths: &[PathBuf],
        layout: &ProjectLayout,
        exclude_dirs: &[String],
    ) -> Self {
        let mut registry = Self::new();
        let mut seen_markers: HashSet<PathBuf> = HashSet::new();

        let project_dir = fs
            .canonicalize(&layout.project_dir)
            .unwrap_or_else(|_| layout.project_dir.clone());

        let prune = |dir: &Path| {
            let excluded_name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| exclude_dirs.iter().any(|ex| ex == name));
            excluded_name || dir.starts_with(&layout.project_dir) || dir.starts_with(&project_dir)
        };

        for search_path in search_paths {
            if prune(search_path) {
                debug!(?search_path, "search path lies inside the project; skipping");
                continue;
            }

            for listing in walk_dirs(fs, search_path, false, prune) {
                if !is_recordable(&listing.dir) {
                    continue;
                }
                for lang in Lang::ALL {
                    let marker = lang.marker(&listing.dir);
                    if !fs.is_file(&marker) {
                        continue;
                    }
                    let canonical = fs.canonicalize(&marker).unwrap_or_else(|_| marker.clone());
                    if !seen_markers.insert(canonical) {
                        continue;
                    }

                    let name = package_name(&listing.dir);
                    info!(package = %name, %lang, marker = ?marker, "found package assets");
                    registry.push(
                        lang,
                        PackageAssets {
                            name,
                            source_dir: lang.asset_dir(&listing.dir),
                        },
                    );
                }
            }
        }

        registry
    }
}

fn package_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}

/// Installed packages live in `site-packages`; the rest of `lib/pythonX.Y` is
/// the standard library, which never ships frontend assets.
fn is_recordable(dir: &Path) -> bool {
    let s = dir.to_string_lossy().replace('\\', "/");
    !s.contains("lib/python") || s.contains("site-packages")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_directories_are_not_recordable() {
        assert!(!is_recordable(Path::new("/usr/lib/python3.12/json")));
        assert!(is_recordable(Path::new("/venv/lib/python3.12/site-packages/widgets")));
        assert!(is_recordable(Path::new("/home/me/src/widgets")));
    }
}
