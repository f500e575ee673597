// src/discover/mod.rs

//! Discovery of the project and of the frontend assets it should build.
//!
//! - [`locator`] finds the project package and `manage.py`.
//! - [`search_path`] decides where installed packages live.
//! - [`registry`] finds installed packages shipping `static/<lang>/index.*`.
//! - [`scanner`] finds the project's own entry points, bundle destinations
//!   and the files to watch.
//!
//! Everything here only reads the filesystem.

pub mod locator;
pub mod registry;
pub mod scanner;
pub mod search_path;
pub mod walk;

use std::path::Path;

use tracing::info;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::ToolBackend;
use crate::fs::FileSystem;
use crate::state::ProjectState;
use crate::watch::{ExcludeSet, WatchTable};

pub use locator::{locate_project, ProjectLayout};
pub use registry::{AssetRegistry, PackageAssets};
pub use scanner::{EntryPoints, OutputDirs, ProjectScan};
pub use search_path::{normalize_search_paths, resolve_search_paths};

/// Run the whole discovery phase and assemble the [`ProjectState`].
///
/// `root` should already be absolute so recorded paths (and the symlinks
/// later created from them) stay valid regardless of working directory.
pub async fn discover_project<B: ToolBackend>(
    fs: &dyn FileSystem,
    backend: &mut B,
    root: &Path,
    explicit_package: Option<&Path>,
    cfg: &ConfigFile,
) -> Result<ProjectState> {
    let package = explicit_package.or(cfg.project.package.as_deref());
    let layout = locate_project(fs, root, package)?;

    let search_paths =
        resolve_search_paths(fs, backend, root, &cfg.tools.python, &cfg.project.search_paths).await;
    info!(count = search_paths.len(), "searching installed packages");

    let registry = AssetRegistry::discover(fs, &search_paths, &layout, &cfg.project.exclude_dirs);
    if registry.is_empty() {
        info!("no installed package ships frontend assets");
    }

    let exclude = ExcludeSet::new(root, &cfg.watch.exclude)?;
    let mut watch = WatchTable::new(exclude);
    let scan = ProjectScan::scan(fs, &layout.project_dir, &mut watch);

    Ok(ProjectState {
        layout,
        entries: scan.entries,
        outputs: scan.outputs,
        registry,
        watch,
    })
}
