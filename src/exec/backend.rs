// src/exec/backend.rs

//! Pluggable tool backend abstraction.
//!
//! The pipeline talks to a `ToolBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation here.
//!
//! - `RealToolBackend` is the default implementation used by `jazzhands`.
//!   It spawns OS processes with `tokio::process::Command`.
//! - Tests provide their own `ToolBackend` that records which invocations
//!   were requested and answers with scripted output.

use std::fs::OpenOptions;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{JazzhandsError, Result};

use super::command::{OutputTarget, ToolInvocation, ToolOutput};

/// Trait abstracting how external tools are run.
///
/// Production code uses [`RealToolBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ToolBackend: Send {
    /// Find an installed program.
    ///
    /// Paths with more than one component are checked on disk; bare names
    /// are looked up on `PATH`.
    fn locate(&self, program: &Path) -> Option<PathBuf>;

    /// Run a tool to completion.
    ///
    /// A non-zero exit is **not** an error; callers inspect `ToolOutput`.
    /// Failing to start the program at all is.
    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send + '_>>;

    /// Start a tool in the background and forget about it.
    fn spawn_detached(&mut self, invocation: ToolInvocation) -> Result<()>;
}

/// Real backend used in production.
#[derive(Debug, Clone, Default)]
pub struct RealToolBackend;

impl RealToolBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ToolBackend for RealToolBackend {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        if program.is_absolute() || program.components().count() > 1 {
            program.is_file().then(|| program.to_path_buf())
        } else {
            which::which(program).ok()
        }
    }

    fn run(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutput>> + Send + '_>> {
        Box::pin(async move {
            debug!(cmd = %invocation, cwd = ?invocation.cwd, "running tool");

            let mut cmd = Command::new(&invocation.program);
            cmd.args(&invocation.args);
            if let Some(cwd) = &invocation.cwd {
                cmd.current_dir(cwd);
            }

            match &invocation.stdin {
                Some(path) => {
                    let file = std::fs::File::open(path)
                        .with_context(|| format!("opening {:?} as stdin for {}", path, invocation.program_name()))?;
                    cmd.stdin(Stdio::from(file));
                }
                None => {
                    cmd.stdin(Stdio::null());
                }
            }

            match &invocation.stdout {
                OutputTarget::Inherit => {
                    cmd.stdout(Stdio::inherit());
                }
                OutputTarget::Capture => {
                    cmd.stdout(Stdio::piped());
                }
                OutputTarget::AppendTo(path) => {
                    let file = OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)
                        .with_context(|| format!("opening {:?} for appending", path))?;
                    cmd.stdout(Stdio::from(file));
                }
            }

            cmd.stderr(Stdio::piped()).kill_on_drop(true);

            let child = cmd
                .spawn()
                .map_err(|err| spawn_error(&invocation, err))?;

            let output = child
                .wait_with_output()
                .await
                .with_context(|| format!("waiting for {}", invocation.program_name()))?;

            let result = ToolOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };

            debug!(
                tool = %invocation.program_name(),
                exit_code = result.exit_code(),
                "tool exited"
            );

            Ok(result)
        })
    }

    fn spawn_detached(&mut self, invocation: ToolInvocation) -> Result<()> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        // Dropping the handle leaves the process running; nothing supervises it.
        let child = cmd
            .spawn()
            .map_err(|err| spawn_error(&invocation, err))?;

        info!(cmd = %invocation, pid = ?child.id(), "started background process");
        Ok(())
    }
}

fn spawn_error(invocation: &ToolInvocation, err: io::Error) -> JazzhandsError {
    if err.kind() == io::ErrorKind::NotFound {
        JazzhandsError::ToolMissing {
            tool: invocation.program_name(),
            program: invocation.program.display().to_string(),
            hint: "Install it, or point the [tools] section of Jazzhands.toml at it.".to_string(),
        }
    } else {
        JazzhandsError::Other(
            anyhow::Error::new(err).context(format!("spawning {}", invocation.program_name())),
        )
    }
}
