// src/discover/scanner.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::discover::walk::walk_dirs;
use crate::fs::FileSystem;
use crate::types::{AssetFamily, Lang};
use crate::watch::WatchTable;

/// The project's own entry file per language. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints {
    files: BTreeMap<Lang, PathBuf>,
}

impl EntryPoints {
    pub fn get(&self, lang: Lang) -> Option<&Path> {
        self.files.get(&lang).map(PathBuf::as_path)
    }

    pub fn has(&self, lang: Lang) -> bool {
        self.files.contains_key(&lang)
    }

    /// Directory holding the entry file.
    pub fn dir(&self, lang: Lang) -> Option<&Path> {
        self.get(lang).and_then(Path::parent)
    }

    /// Record `path` unless an entry for `lang` already exists.
    fn set_if_absent(&mut self, lang: Lang, path: PathBuf) -> bool {
        if self.files.contains_key(&lang) {
            return false;
        }
        self.files.insert(lang, path);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lang, &Path)> {
        self.files.iter().map(|(lang, path)| (*lang, path.as_path()))
    }
}

/// Where bundles are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDirs {
    pub css: Option<PathBuf>,
    pub js: Option<PathBuf>,
}

impl OutputDirs {
    pub fn get(&self, family: AssetFamily) -> Option<&Path> {
        match family {
            AssetFamily::Css => self.css.as_deref(),
            AssetFamily::Js => self.js.as_deref(),
        }
    }

    pub fn bundle_path(&self, family: AssetFamily) -> Option<PathBuf> {
        self.get(family).map(|dir| dir.join(family.bundle_file_name()))
    }

    fn slot(&mut self, family: AssetFamily) -> &mut Option<PathBuf> {
        match family {
            AssetFamily::Css => &mut self.css,
            AssetFamily::Js => &mut self.js,
        }
    }
}

/// Result of walking the project's own tree.
#[derive(Debug, Clone)]
pub struct ProjectScan {
    pub entries: EntryPoints,
    pub outputs: OutputDirs,
}

impl ProjectScan {
    /// Walk the project package (following symlinks, skipping anything under
    /// `node_modules`) in lexicographic order.
    ///
    /// Finds entry files and output directories, and seeds `watch` with every
    /// `.js`, `.less` and `.styl` file.
    pub fn scan(fs: &dyn FileSystem, project_dir: &Path, watch: &mut WatchTable) -> Self {
        let mut entries = EntryPoints::default();
        let mut outputs = OutputDirs::default();

        // Only components below the project count; the project itself may
        // live under a node_modules directory.
        let in_node_modules = |dir: &Path| {
            dir.strip_prefix(project_dir)
                .map(|rel| rel.components().any(|c| c.as_os_str() == "node_modules"))
                .unwrap_or(false)
        };

        for listing in walk_dirs(fs, project_dir, true, in_node_modules) {
            for lang in Lang::ALL {
                if listing.has_file(&lang.index_file_name())
                    && entries.set_if_absent(lang, listing.dir.join(lang.index_file_name()))
                {
                    info!(%lang, dir = ?listing.dir, "found project entry point");
                }
            }

            for family in [AssetFamily::Css, AssetFamily::Js] {
                let slot = outputs.slot(family);
                if slot.is_none() && listing.dir.ends_with(family.output_dir_suffix()) {
                    info!(bundle = family.bundle_file_name(), dir = ?listing.dir, "found bundle destination");
                    *slot = Some(listing.dir.clone());
                }
            }

            for file in &listing.files {
                if let Some(lang) = Lang::from_path(file) {
                    match fs.modified(file) {
                        Ok(mtime) => {
                            watch.record(lang, file, mtime);
                        }
                        Err(err) => warn!(?file, error = %err, "cannot read modification time"),
                    }
                }
            }
        }

        // Bundles without a static/js directory go next to the entry file.
        if outputs.js.is_none() {
            if let Some(dir) = entries.dir(Lang::Js) {
                debug!(?dir, "no static/js directory; writing bundle.js next to index.js");
                outputs.js = Some(dir.to_path_buf());
            }
        }

        Self { entries, outputs }
    }
}
