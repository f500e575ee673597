// src/discover/search_path.rs

//! Where to look for installed packages.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::exec::{resolve_program, ToolBackend, ToolInvocation};
use crate::fs::FileSystem;

const SYS_PATH_SCRIPT: &str = "import sys; print('\\n'.join(sys.path))";

/// Resolve the package search paths.
///
/// Configured paths win. Otherwise the interpreter is asked for `sys.path`;
/// if it cannot be run the result is empty and only the project itself is
/// considered.
pub async fn resolve_search_paths<B: ToolBackend>(
    fs: &dyn FileSystem,
    backend: &mut B,
    root: &Path,
    python: &str,
    configured: &[PathBuf],
) -> Vec<PathBuf> {
    if !configured.is_empty() {
        return normalize_search_paths(fs, root, configured.iter().map(|p| p.to_string_lossy().into_owned()));
    }

    let invocation = ToolInvocation::new(resolve_program(root, python))
        .args(["-c", SYS_PATH_SCRIPT])
        .cwd(root);

    match backend.run(invocation).await {
        Ok(output) if output.success() => {
            normalize_search_paths(fs, root, output.stdout.lines().map(str::to_string))
        }
        Ok(output) => {
            warn!(
                exit_code = output.exit_code(),
                stderr = %output.stderr.trim(),
                "python could not report sys.path; no installed packages will be collected"
            );
            Vec::new()
        }
        Err(err) => {
            warn!(error = %err, "python is unavailable; no installed packages will be collected");
            Vec::new()
        }
    }
}

/// Empty entries mean the root, relative ones are resolved against it, and
/// entries that don't exist (zip imports, stale paths) are dropped along
/// with duplicates.
pub fn normalize_search_paths<I>(fs: &dyn FileSystem, root: &Path, raw: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<PathBuf> = Vec::new();
    for entry in raw {
        let entry = entry.trim();
        let path = if entry.is_empty() || entry == "." {
            root.to_path_buf()
        } else if Path::new(entry).is_absolute() {
            PathBuf::from(entry)
        } else {
            root.join(entry)
        };

        if !fs.is_dir(&path) {
            debug!(?path, "ignoring search path that is not a directory");
            continue;
        }
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}
