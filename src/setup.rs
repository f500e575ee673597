// src/setup.rs

//! One-time project setup: `.babelrc` plus the transpiler toolchain.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{JazzhandsError, Result};
use crate::exec::{resolve_program, OutputTarget, ToolBackend, ToolInvocation};
use crate::fs::FileSystem;

pub const BABELRC_FILE: &str = ".babelrc";

const DEFAULT_PRESET: &str = "es2017";

/// Packages installed regardless of the chosen presets and transforms.
const BASE_PACKAGES: [&str; 3] = ["babel-core", "babel-cli", "babelify"];

/// Contents of `.babelrc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BabelConfig {
    pub presets: Vec<String>,
    pub plugins: Vec<String>,
}

impl BabelConfig {
    /// Presets fall back to `es2017`; transforms become `transform-<name>`
    /// plugins.
    pub fn new(presets: &[String], transforms: &[String]) -> Self {
        let presets = if presets.is_empty() {
            vec![DEFAULT_PRESET.to_string()]
        } else {
            presets.to_vec()
        };
        let plugins = transforms.iter().map(|t| format!("transform-{t}")).collect();
        Self { presets, plugins }
    }

    /// npm packages providing this configuration.
    pub fn npm_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = BASE_PACKAGES.iter().map(|p| p.to_string()).collect();
        packages.extend(self.presets.iter().map(|p| format!("babel-preset-{p}")));
        packages.extend(self.plugins.iter().map(|p| format!("babel-plugin-{p}")));
        packages
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `<root>/.babelrc` and install the packages it names.
///
/// Never overwrites an existing `.babelrc`.
pub async fn setup_project<B: ToolBackend>(
    fs: &dyn FileSystem,
    backend: &mut B,
    root: &Path,
    npm: &str,
    babel: &BabelConfig,
) -> Result<PathBuf> {
    let babelrc = root.join(BABELRC_FILE);
    if fs.exists(&babelrc) {
        return Err(JazzhandsError::WouldOverwrite(babelrc.display().to_string()));
    }

    let mut contents = babel.to_json()?;
    contents.push('\n');
    fs.write(&babelrc, contents.as_bytes())?;
    info!(path = ?babelrc, presets = ?babel.presets, plugins = ?babel.plugins, "wrote babel config");

    let invocation = ToolInvocation::new(resolve_program(root, npm))
        .args(["install", "--save"])
        .args(babel.npm_packages())
        .cwd(root.to_path_buf())
        .stdout(OutputTarget::Inherit);

    info!(cmd = %invocation, "installing babel toolchain");
    let output = backend.run(invocation).await?;
    if !output.success() {
        warn!(
            exit_code = output.exit_code(),
            stderr = %output.stderr.trim(),
            "npm install failed; install the babel packages manually"
        );
    }

    Ok(babelrc)
}
