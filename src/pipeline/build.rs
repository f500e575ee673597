// src/pipeline/build.rs

//! Running the stylesheet compilers and the JavaScript bundler.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;
use tracing::{error, info, warn};

use crate::errors::{JazzhandsError, Result};
use crate::exec::{OutputTarget, ToolBackend, ToolInvocation, ToolOutput};
use crate::types::{AssetFamily, Lang};

use super::Pipeline;

const LESSC_HINT: &str = "Less files found, but lessc is not installed.\n\
To fix, install it with:\n    npm install --save less";

const STYLUS_HINT: &str = "Stylus files found, but stylus is not installed.\n\
To fix, install it in this project with:\n    npm install --save stylus\nor\n    yarn add stylus";

const BROWSERIFY_HINT: &str = "JavaScript found, but browserify is not installed.\n\
To fix, install it in this project with:\n    npm install --save browserify babelify";

const NPM_HINT: &str = "npm is required to install missing JavaScript modules.";

/// Outcome of a bundler run that got as far as starting the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Built,
    /// Nothing to build: no entry point or no output directory.
    Skipped,
    Failed { exit_code: i32 },
}

impl BuildStatus {
    pub fn is_built(self) -> bool {
        self == BuildStatus::Built
    }
}

/// Extract the module name from the bundler's "Cannot find module" report.
pub fn missing_module(stderr: &str) -> Option<String> {
    let re = Regex::new(r"Cannot find module '([^']+)' from").ok()?;
    re.captures(stderr).map(|caps| caps[1].to_string())
}

impl<B: ToolBackend> Pipeline<B> {
    /// Build everything buildable: stylesheets, then scripts.
    pub async fn build_all(&mut self) -> Result<()> {
        self.check_stylesheet_mode()?;

        if self.state.has_stylesheets() {
            self.build_stylesheets().await?;
        }

        if self.state.is_buildable(Lang::Js) {
            self.build_scripts().await?;
        }

        Ok(())
    }

    /// Regenerate `bundle.css` from scratch: Less output first, then the
    /// Stylus output appended.
    ///
    /// The bundle is removed up front, so running this twice never
    /// duplicates Stylus output.
    pub async fn build_stylesheets(&mut self) -> Result<()> {
        if !self.state.has_stylesheets() {
            return Ok(());
        }
        let bundle = self
            .state
            .bundle_path(AssetFamily::Css)
            .ok_or(JazzhandsError::NoCssDestination)?;

        reset_bundle(&bundle)?;

        if self.state.entries.has(Lang::Less) {
            self.build_less(&bundle).await?;
        }
        if self.state.entries.has(Lang::Styl) {
            self.build_stylus(&bundle).await?;
        }

        Ok(())
    }

    async fn build_less(&mut self, bundle: &Path) -> Result<()> {
        let Some(entry) = self.state.entries.get(Lang::Less).map(Path::to_path_buf) else {
            return Ok(());
        };
        let lessc = self.require_tool("lessc", &self.config.tools.lessc, LESSC_HINT)?;

        info!(?entry, ?bundle, "Building Less");
        let invocation = ToolInvocation::new(lessc)
            .path_arg(&entry)
            .path_arg(bundle)
            .cwd(self.state.layout.root.clone())
            .stdout(OutputTarget::Inherit);

        let output = self.backend.run(invocation).await?;
        if !output.success() {
            report_failure("lessc", &output);
        }
        Ok(())
    }

    async fn build_stylus(&mut self, bundle: &Path) -> Result<()> {
        let Some(entry) = self.state.entries.get(Lang::Styl).map(Path::to_path_buf) else {
            return Ok(());
        };
        let Some(entry_dir) = entry.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        let stylus = self.require_tool("stylus", &self.config.tools.stylus, STYLUS_HINT)?;

        info!(?entry, ?bundle, "Building Stylus");
        // Run from the entry's directory so relative imports resolve.
        let invocation = ToolInvocation::new(stylus)
            .arg("--resolve-url")
            .cwd(entry_dir)
            .stdin_from(entry)
            .stdout(OutputTarget::AppendTo(bundle.to_path_buf()));

        let output = self.backend.run(invocation).await?;
        if !output.success() {
            report_failure("stylus", &output);
        }
        Ok(())
    }

    /// Bundle `index.js` into `bundle.js`.
    ///
    /// With auto-install enabled, a "Cannot find module" failure installs
    /// the module and retries. Each module is installed at most once and the
    /// number of installs is capped, so a module that stays missing after
    /// installation ends the loop.
    pub async fn build_scripts(&mut self) -> Result<BuildStatus> {
        let (Some(entry), Some(bundle)) = (
            self.state.entries.get(Lang::Js).map(Path::to_path_buf),
            self.state.bundle_path(AssetFamily::Js),
        ) else {
            return Ok(BuildStatus::Skipped);
        };
        let browserify =
            self.require_tool("browserify", &self.config.tools.browserify, BROWSERIFY_HINT)?;
        let max_installs = self.config.watch.max_install_retries;

        let mut installed: HashSet<String> = HashSet::new();

        loop {
            info!(?entry, ?bundle, "Building JS");
            let invocation = ToolInvocation::new(&browserify)
                .args(["-t", "[", "babelify", "]"])
                .path_arg(&entry)
                .arg("-o")
                .path_arg(&bundle)
                .cwd(self.state.layout.root.clone());

            let output = self.backend.run(invocation).await?;
            if output.success() {
                info!(?bundle, "JS bundle written");
                return Ok(BuildStatus::Built);
            }

            let failed = BuildStatus::Failed {
                exit_code: output.exit_code(),
            };

            if !self.options.auto_install {
                report_failure("browserify", &output);
                return Ok(failed);
            }

            if installed.is_empty() {
                warn!("--auto-npm is experimental; review package.json changes before committing");
            }

            let Some(module) = missing_module(&output.stderr) else {
                report_failure("browserify", &output);
                return Ok(failed);
            };

            if installed.contains(&module) {
                warn!(%module, "module is still missing after installing it; giving up");
                report_failure("browserify", &output);
                return Ok(failed);
            }

            if installed.len() >= max_installs {
                warn!(%module, limit = max_installs, "too many automatic installs; giving up");
                report_failure("browserify", &output);
                return Ok(failed);
            }

            self.install_module(&module).await?;
            installed.insert(module);
        }
    }

    async fn install_module(&mut self, module: &str) -> Result<()> {
        let npm = self.require_tool("npm", &self.config.tools.npm, NPM_HINT)?;

        info!(%module, "installing missing module");
        let invocation = ToolInvocation::new(npm)
            .args(["install", "--save", module])
            .cwd(self.state.layout.root.clone())
            .stdout(OutputTarget::Inherit);

        let output = self.backend.run(invocation).await?;
        if !output.success() {
            warn!(
                %module,
                exit_code = output.exit_code(),
                stderr = %output.stderr.trim(),
                "npm install failed"
            );
        }
        Ok(())
    }
}

fn reset_bundle(bundle: &Path) -> Result<()> {
    match fs::remove_file(bundle) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(anyhow::Error::from(err)
            .context(format!("removing stale {:?}", bundle))
            .into()),
    }
}

fn report_failure(tool: &str, output: &ToolOutput) {
    error!(
        tool,
        exit_code = output.exit_code(),
        stdout = %output.stdout.trim(),
        stderr = %output.stderr.trim(),
        "build step failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_module_name() {
        let stderr = "Error: Cannot find module 'left-pad' from '/srv/app/static/js'\n    at ...";
        assert_eq!(missing_module(stderr).as_deref(), Some("left-pad"));
    }

    #[test]
    fn scoped_module_names_survive() {
        let stderr = "Cannot find module '@babel/polyfill' from '/srv/app'";
        assert_eq!(missing_module(stderr).as_deref(), Some("@babel/polyfill"));
    }

    #[test]
    fn unrelated_errors_have_no_module() {
        assert_eq!(missing_module("SyntaxError: Unexpected token (3:4)"), None);
        assert_eq!(missing_module(""), None);
    }
}
