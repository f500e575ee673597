// src/discover/locator.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::{JazzhandsError, Result};
use crate::fs::FileSystem;

/// Where the backend project lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Workspace root: holds `node_modules`, `.babelrc`, and usually the
    /// project package.
    pub root: PathBuf,
    /// The project's main package (the one holding `settings`).
    pub project_dir: PathBuf,
    /// Directory containing `manage.py`.
    pub manage_dir: PathBuf,
}

fn has_settings(fs: &dyn FileSystem, dir: &Path) -> bool {
    fs.exists(&dir.join("settings")) || fs.exists(&dir.join("settings.py"))
}

/// Locate the project's main package under `root`.
///
/// With an explicit package, it only has to exist. Otherwise every child
/// directory holding a `settings` package or `settings.py` module is a
/// candidate and the lexicographically first one wins.
pub fn locate_project(
    fs: &dyn FileSystem,
    root: &Path,
    explicit_package: Option<&Path>,
) -> Result<ProjectLayout> {
    let mut children = fs
        .read_dir(root)
        .map_err(|_| JazzhandsError::ProjectNotFound(root.display().to_string()))?;
    children.sort();

    let project_dir = match explicit_package {
        Some(package) => {
            let dir = if package.is_absolute() {
                package.to_path_buf()
            } else {
                root.join(package)
            };
            if !fs.is_dir(&dir) {
                return Err(JazzhandsError::ProjectNotFound(dir.display().to_string()));
            }
            dir
        }
        None => {
            let candidates: Vec<&PathBuf> = children
                .iter()
                .filter(|child| fs.is_dir(child) && has_settings(fs, child))
                .collect();

            let Some(first) = candidates.first() else {
                return Err(JazzhandsError::ProjectNotFound(root.display().to_string()));
            };
            if candidates.len() > 1 {
                warn!(
                    chosen = ?first,
                    others = ?&candidates[1..],
                    "several directories look like the main project package"
                );
            }
            (*first).clone()
        }
    };

    let manage_dir = if fs.is_file(&root.join("manage.py")) {
        root.to_path_buf()
    } else {
        children
            .iter()
            .find(|child| fs.is_dir(child) && fs.is_file(&child.join("manage.py")))
            .cloned()
            .unwrap_or_else(|| root.to_path_buf())
    };

    info!(project = ?project_dir, manage = ?manage_dir, "located project");

    Ok(ProjectLayout {
        root: root.to_path_buf(),
        project_dir,
        manage_dir,
    })
}
