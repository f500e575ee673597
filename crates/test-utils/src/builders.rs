#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use jazzhands::config::{ConfigFile, RawConfigFile};
use jazzhands::types::StylesheetMode;
use tempfile::TempDir;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// All defaults. With no search paths configured, discovery asks the
    /// backend's `python` for `sys.path`.
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn package(mut self, name: &str) -> Self {
        self.config.project.package = Some(PathBuf::from(name));
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.project.search_paths.push(path.into());
        self
    }

    pub fn stylesheet_mode(mut self, mode: StylesheetMode) -> Self {
        self.config.project.stylesheet_mode = mode;
        self
    }

    pub fn max_install_retries(mut self, n: usize) -> Self {
        self.config.watch.max_install_retries = n;
        self
    }

    pub fn watch_exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn jsx_registry(mut self, enabled: bool) -> Self {
        self.config.integrations.jsx_registry = enabled;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway workspace on disk.
///
/// The root is canonicalized up front so paths compare equal to what
/// discovery records.
pub struct ProjectTree {
    dir: TempDir,
    root: PathBuf,
}

impl ProjectTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        Self { dir, root }
    }

    /// A Django-style workspace: `manage.py` at the root and
    /// `<package>/settings.py`.
    pub fn django(package: &str) -> Self {
        Self::new()
            .file("manage.py", "")
            .file(&format!("{package}/__init__.py"), "")
            .file(&format!("{package}/settings.py"), "")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        self.write(rel, contents);
        self
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.path(rel)).expect("create dir");
        self
    }

    /// Write (or overwrite) a file, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn is_symlink(&self, rel: &str) -> bool {
        fs::symlink_metadata(self.path(rel))
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// Keep the directory around after the test, e.g. for debugging.
    pub fn into_temp_dir(self) -> TempDir {
        self.dir
    }
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}
