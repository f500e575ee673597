// src/pipeline/mod.rs

//! Collect and build stages.
//!
//! A [`Pipeline`] owns the [`ProjectState`] produced by discovery together
//! with the tool backend, and exposes the operations the CLI and the watch
//! loop need:
//!
//! - [`collect`](Pipeline::collect) / [`collect_all`](Pipeline::collect_all)
//!   (see `collect.rs`)
//! - [`build_stylesheets`](Pipeline::build_stylesheets),
//!   [`build_scripts`](Pipeline::build_scripts) and
//!   [`build_all`](Pipeline::build_all) (see `build.rs`)

pub mod build;
pub mod collect;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::ConfigFile;
use crate::engine::{BuildPlan, CoreCommand};
use crate::errors::{JazzhandsError, Result};
use crate::exec::{resolve_program, ToolBackend, ToolInvocation};
use crate::fs::FileSystem;
use crate::state::ProjectState;
use crate::types::Lang;
use crate::watch::ChangeSet;

pub use build::{missing_module, BuildStatus};
pub use collect::{copy_tree, pull_app_assets};

/// Per-invocation switches that don't come from the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// `run --auto-npm`: install modules the bundler reports missing.
    pub auto_install: bool,
}

pub struct Pipeline<B: ToolBackend> {
    state: ProjectState,
    config: ConfigFile,
    options: PipelineOptions,
    backend: B,
    fs: Arc<dyn FileSystem>,
}

impl<B: ToolBackend> std::fmt::Debug for Pipeline<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("state", &self.state)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<B: ToolBackend> Pipeline<B> {
    pub fn new(
        state: ProjectState,
        config: ConfigFile,
        options: PipelineOptions,
        backend: B,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            state,
            config,
            options,
            backend,
            fs,
        }
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn build_plan(&self) -> BuildPlan {
        BuildPlan {
            less: self.state.is_buildable(Lang::Less),
            styl: self.state.is_buildable(Lang::Styl),
            js: self.state.is_buildable(Lang::Js),
        }
    }

    /// Refuse mixed Less/Stylus projects when configured as exclusive.
    pub fn check_stylesheet_mode(&self) -> Result<()> {
        self.state.check_stylesheet_mode(self.config.project.stylesheet_mode)
    }

    pub fn poll_changes(&mut self) -> ChangeSet {
        self.state.watch.poll(self.fs.as_ref())
    }

    pub async fn execute(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Collect(lang) => self.collect(lang).await,
            CoreCommand::BuildStylesheets => self.build_stylesheets().await,
            CoreCommand::BuildScripts => self.build_scripts().await.map(|_| ()),
        }
    }

    /// Start `manage.py runserver` in the background. Nothing watches it
    /// afterwards.
    pub fn launch_dev_server(&mut self) -> Result<()> {
        let python = self.program(&self.config.tools.python);
        let invocation = ToolInvocation::new(python)
            .args(["manage.py", "runserver"])
            .arg(self.config.server.address.clone())
            .cwd(self.state.layout.manage_dir.clone());

        info!(address = %self.config.server.address, "starting development server");
        self.backend.spawn_detached(invocation)
    }

    fn program(&self, configured: &str) -> PathBuf {
        resolve_program(&self.state.layout.root, configured)
    }

    /// Resolve a tool and make sure it is installed.
    fn require_tool(&self, tool: &str, configured: &str, hint: &str) -> Result<PathBuf> {
        let program = self.program(configured);
        self.backend
            .locate(&program)
            .ok_or_else(|| JazzhandsError::ToolMissing {
                tool: tool.to_string(),
                program: program.display().to_string(),
                hint: hint.to_string(),
            })
    }
}
