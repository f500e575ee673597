// src/pipeline/collect.rs

//! Bringing installed packages' assets into the project.
//!
//! JavaScript packages are copied into `node_modules/<package>` so the
//! bundler can import them, then transpiled in place. Less and Stylus
//! packages are symlinked next to the project's own `index.less` /
//! `index.styl` for relative importing.
//!
//! Deciding what to watch and what to transpile goes through the pipeline's
//! [`FileSystem`]. Replacing a destination ([`pull_app_assets`],
//! [`copy_tree`]) needs symlinks and recursive removal, which the trait does
//! not model, so those two work on the real disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::discover::walk::walk_dirs;
use crate::discover::PackageAssets;
use crate::errors::Result;
use crate::exec::{OutputTarget, ToolBackend, ToolInvocation};
use crate::fs::FileSystem;
use crate::types::Lang;

use super::Pipeline;

const BABEL_HINT: &str = "JavaScript found, but babel is not installed.\n\
To fix, install babel in this project:\n    jazzhands setup\n\
This will update your package.json, so look at the changes and commit them appropriately.";

/// Name of the file `manage.py compilejsx` generates next to `index.js`.
pub const JSX_REGISTRY_FILE: &str = "jsx_registry.js";

impl<B: ToolBackend> Pipeline<B> {
    /// Collect every buildable language: Stylus and Less when there is a CSS
    /// destination, JS when there is a JS entry point.
    pub async fn collect_all(&mut self) -> Result<()> {
        for lang in [Lang::Styl, Lang::Less] {
            if self.state.is_buildable(lang) {
                self.collect(lang).await?;
            }
        }

        if self.state.is_buildable(Lang::Js) {
            self.compile_jsx_registry().await?;
            self.collect(Lang::Js).await?;
        }

        Ok(())
    }

    /// Copy (JS) or link (Less/Stylus) each discovered package's assets into
    /// place, replacing whatever was there.
    pub async fn collect(&mut self, lang: Lang) -> Result<()> {
        let packages = self.state.registry.packages(lang).to_vec();
        if packages.is_empty() {
            info!("No {lang} to collect");
            return Ok(());
        }

        for package in packages {
            let Some(dest) = self.destination(lang, &package) else {
                info!(%lang, package = %package.name, "project has no {lang} entry point; not collecting");
                continue;
            };

            info!(
                package = %package.name,
                %lang,
                from = ?package.source_dir,
                to = ?dest,
                "collecting assets"
            );

            if lang == Lang::Js {
                self.watch_package_sources(&package.source_dir);
            }

            pull_app_assets(&package.source_dir, &dest, lang == Lang::Js)?;

            if lang == Lang::Js {
                self.transpile(&dest).await?;
            }
        }

        Ok(())
    }

    fn destination(&self, lang: Lang, package: &PackageAssets) -> Option<PathBuf> {
        match lang {
            Lang::Js => Some(
                self.state
                    .layout
                    .root
                    .join("node_modules")
                    .join(&package.name),
            ),
            Lang::Less | Lang::Styl => self.state.entries.dir(lang).map(|dir| dir.join(&package.name)),
        }
    }

    /// Installed JS packages are watched at their source, so editing a
    /// package in development re-collects it.
    fn watch_package_sources(&mut self, source_dir: &Path) {
        for path in js_files(self.fs.as_ref(), source_dir) {
            if let Err(err) = self.state.watch.record_from_fs(self.fs.as_ref(), &path) {
                warn!(?path, error = %err, "cannot watch package source");
            }
        }
    }

    /// Run every `.js` file under `target` (or `target` itself) through the
    /// transpiler, overwriting it in place.
    pub(crate) async fn transpile(&mut self, target: &Path) -> Result<()> {
        let files = if self.fs.is_dir(target) {
            js_files(self.fs.as_ref(), target)
        } else if Lang::from_path(target) == Some(Lang::Js) && self.fs.is_file(target) {
            vec![target.to_path_buf()]
        } else {
            Vec::new()
        };

        if files.is_empty() {
            return Ok(());
        }

        let babel = self.require_tool("babel", &self.config.tools.babel, BABEL_HINT)?;

        for file in files {
            let invocation = ToolInvocation::new(&babel)
                .path_arg(&file)
                .arg("-o")
                .path_arg(&file)
                .cwd(self.state.layout.root.clone());

            let output = self.backend.run(invocation).await?;
            if output.success() {
                info!(?file, "JSX processed");
            } else {
                warn!(
                    ?file,
                    exit_code = output.exit_code(),
                    stderr = %output.stderr.trim(),
                    "babel failed to transpile file"
                );
            }
        }

        Ok(())
    }

    /// Optional `django_jsx` integration: regenerate `jsx_registry.js` next
    /// to `index.js` when the package is importable.
    async fn compile_jsx_registry(&mut self) -> Result<()> {
        if !self.config.integrations.jsx_registry {
            return Ok(());
        }
        let Some(entry_dir) = self.state.entries.dir(Lang::Js).map(Path::to_path_buf) else {
            return Ok(());
        };

        let python = self.program(&self.config.tools.python);
        let manage_dir = self.state.layout.manage_dir.clone();

        let import_check = ToolInvocation::new(&python)
            .args(["-c", "import django_jsx"])
            .cwd(manage_dir.clone());
        match self.backend.run(import_check).await {
            Ok(output) if output.success() => {}
            _ => {
                debug!("django_jsx is not importable; skipping JSX registry");
                return Ok(());
            }
        }

        let registry = entry_dir.join(JSX_REGISTRY_FILE);
        info!(?registry, "compiling JSX registry");
        let invocation = ToolInvocation::new(&python)
            .args(["manage.py", "compilejsx", "-o"])
            .path_arg(&registry)
            .cwd(manage_dir)
            .stdout(OutputTarget::Inherit);

        let output = self.backend.run(invocation).await?;
        if !output.success() {
            warn!(
                exit_code = output.exit_code(),
                stderr = %output.stderr.trim(),
                "manage.py compilejsx failed"
            );
            return Ok(());
        }

        self.transpile(&registry).await?;

        // Our own rewrite must not look like an edit on the first poll.
        if let Err(err) = self.state.watch.record_from_fs(self.fs.as_ref(), &registry) {
            debug!(error = %err, "JSX registry not watchable");
        }
        Ok(())
    }
}

/// Copy or symlink an asset directory from one location to another.
///
/// An existing symlink at `to` is unlinked and an existing directory is
/// removed recursively, so the destination is always replaced wholesale.
pub fn pull_app_assets(from: &Path, to: &Path, copy: bool) -> Result<()> {
    match fs::symlink_metadata(to) {
        Ok(meta) if meta.file_type().is_symlink() => remove_symlink(to)?,
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(to).with_context(|| format!("removing {:?}", to))?
        }
        Ok(_) => fs::remove_file(to).with_context(|| format!("removing {:?}", to))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    if copy {
        info!(from = ?from, to = ?to, "copy");
        copy_tree(from, to)?;
    } else {
        info!(from = ?from, to = ?to, "link");
        symlink_dir(from, to).with_context(|| format!("linking {:?} -> {:?}", to, from))?;
    }

    Ok(())
}

/// Recursively copy `from` into `to`, following symlinks. Returns the number
/// of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<u64> {
    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {:?}", from))?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("relativizing {:?}", entry.path()))?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_context(|| format!("creating {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {:?} -> {:?}", entry.path(), target))?;
            copied += 1;
        }
    }

    debug!(files = copied, from = ?from, to = ?to, "copied tree");
    Ok(copied)
}

/// All `.js` files under `dir`, in walk order.
fn js_files(fs: &dyn FileSystem, dir: &Path) -> Vec<PathBuf> {
    walk_dirs(fs, dir, true, |_| false)
        .into_iter()
        .flat_map(|listing| listing.files)
        .filter(|path| Lang::from_path(path) == Some(Lang::Js))
        .collect()
}

#[cfg(unix)]
fn symlink_dir(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(from, to)
}

#[cfg(windows)]
fn symlink_dir(from: &Path, to: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(from, to)
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> Result<()> {
    fs::remove_file(path).with_context(|| format!("unlinking {:?}", path))?;
    Ok(())
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> Result<()> {
    // Directory symlinks on Windows are removed like directories.
    fs::remove_dir(path)
        .or_else(|_| fs::remove_file(path))
        .with_context(|| format!("unlinking {:?}", path))?;
    Ok(())
}
