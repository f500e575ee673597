// src/engine/runtime.rs

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::ToolBackend;
use crate::pipeline::Pipeline;

use super::core::{CoreRuntime, CoreStep};
use super::WatchEvent;

/// Drives the watch core: sleeps, polls the watch table, and executes the
/// core's commands through the [`Pipeline`].
///
/// External tools run one at a time and block the loop until they exit, so
/// bursts of changes are coalesced at the poll interval.
pub struct Runtime<B: ToolBackend> {
    core: CoreRuntime,
    pipeline: Pipeline<B>,
    poll_interval: Duration,
}

impl<B: ToolBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<B: ToolBackend> Runtime<B> {
    pub fn new(pipeline: Pipeline<B>, poll_interval: Duration) -> Self {
        let core = CoreRuntime::new(pipeline.build_plan());
        Self {
            core,
            pipeline,
            poll_interval,
        }
    }

    pub fn core(&self) -> &CoreRuntime {
        &self.core
    }

    /// Poll once and rebuild whatever changed.
    pub async fn tick(&mut self) -> Result<CoreStep> {
        self.core.begin_check();
        let changes = self.pipeline.poll_changes();
        let step = self.core.step(WatchEvent::Polled(changes));
        self.execute(&step).await?;
        Ok(step)
    }

    /// Main loop, stopped by Ctrl-C.
    pub async fn run(self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await.map(|_| ())
    }

    /// Main loop, stopped when `shutdown` resolves. Returns the pipeline so
    /// callers can inspect the final state.
    pub async fn run_until<F, T>(mut self, shutdown: F) -> Result<Pipeline<B>>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        info!(interval_ms = self.poll_interval.as_millis() as u64, "watching for changes");
        tokio::pin!(shutdown);

        loop {
            let interrupted = tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => false,
                res = &mut shutdown => {
                    if let Err(e) = res {
                        warn!("failed to listen for shutdown signal: {e}");
                    }
                    true
                }
            };

            let step = if interrupted {
                self.core.step(WatchEvent::ShutdownRequested)
            } else {
                self.tick().await?
            };

            if !step.keep_running {
                info!("shutdown requested; stopping watch loop");
                break;
            }
        }

        Ok(self.pipeline)
    }

    async fn execute(&mut self, step: &CoreStep) -> Result<()> {
        for command in &step.commands {
            debug!(?command, "executing");
            self.pipeline.execute(*command).await?;
        }
        self.core.finish_rebuild();
        Ok(())
    }
}
