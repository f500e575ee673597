// src/engine/core.rs

//! Pure core of the watch loop.
//!
//! Consumes [`WatchEvent`]s and produces the commands the IO shell should
//! execute. It has no channels, no Tokio types, and does not perform any IO,
//! so it can be unit tested directly.

use tracing::debug;

use crate::engine::{BuildPlan, WatchEvent, WatchPhase};
use crate::types::{AssetFamily, Lang};
use crate::watch::ChangeSet;

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Re-collect external package assets for a language.
    Collect(Lang),
    /// Reset `bundle.css`, then build Less and Stylus into it.
    BuildStylesheets,
    /// Build `bundle.js`.
    BuildScripts,
}

/// Decision returned by the core after handling a single `WatchEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands to execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

#[derive(Debug)]
pub struct CoreRuntime {
    plan: BuildPlan,
    phase: WatchPhase,
}

impl CoreRuntime {
    pub fn new(plan: BuildPlan) -> Self {
        Self {
            plan,
            phase: WatchPhase::Idle,
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    /// Called by the shell right before it polls the filesystem.
    pub fn begin_check(&mut self) {
        self.phase = WatchPhase::Checking;
    }

    /// Called by the shell once every command of a step has run.
    pub fn finish_rebuild(&mut self) {
        self.phase = WatchPhase::Idle;
    }

    pub fn step(&mut self, event: WatchEvent) -> CoreStep {
        match event {
            WatchEvent::Polled(changes) => {
                let commands = self.rebuild_commands(&changes);
                self.phase = if commands.is_empty() {
                    WatchPhase::Idle
                } else {
                    WatchPhase::Rebuilding
                };
                debug!(?changes, ?commands, phase = ?self.phase, "poll handled");
                CoreStep {
                    commands,
                    keep_running: true,
                }
            }
            WatchEvent::ShutdownRequested => {
                self.phase = WatchPhase::Idle;
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    /// Less and Stylus share one bundle, so a change to either rebuilds the
    /// whole stylesheet bundle from scratch.
    fn rebuild_commands(&self, changes: &ChangeSet) -> Vec<CoreCommand> {
        let mut commands = Vec::new();

        if changes.touches(AssetFamily::Css) && self.plan.has_stylesheets() {
            for lang in [Lang::Less, Lang::Styl] {
                if self.plan.can_build(lang) {
                    commands.push(CoreCommand::Collect(lang));
                }
            }
            commands.push(CoreCommand::BuildStylesheets);
        }

        if changes.contains(Lang::Js) && self.plan.js {
            commands.push(CoreCommand::Collect(Lang::Js));
            commands.push(CoreCommand::BuildScripts);
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_plan() -> BuildPlan {
        BuildPlan {
            less: true,
            styl: true,
            js: true,
        }
    }

    #[test]
    fn quiet_poll_stays_idle() {
        let mut core = CoreRuntime::new(full_plan());
        core.begin_check();
        let step = core.step(WatchEvent::Polled(ChangeSet::new()));
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
        assert_eq!(core.phase(), WatchPhase::Idle);
    }

    #[test]
    fn stylus_change_rebuilds_whole_css_bundle() {
        let mut core = CoreRuntime::new(full_plan());
        let step = core.step(WatchEvent::Polled([Lang::Styl].into_iter().collect()));
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::Collect(Lang::Less),
                CoreCommand::Collect(Lang::Styl),
                CoreCommand::BuildStylesheets,
            ]
        );
        assert_eq!(core.phase(), WatchPhase::Rebuilding);
        core.finish_rebuild();
        assert_eq!(core.phase(), WatchPhase::Idle);
    }

    #[test]
    fn js_change_only_touches_scripts() {
        let mut core = CoreRuntime::new(full_plan());
        let step = core.step(WatchEvent::Polled([Lang::Js].into_iter().collect()));
        assert_eq!(
            step.commands,
            vec![CoreCommand::Collect(Lang::Js), CoreCommand::BuildScripts]
        );
    }

    #[test]
    fn unbuildable_languages_are_ignored() {
        let mut core = CoreRuntime::new(BuildPlan {
            less: false,
            styl: false,
            js: true,
        });
        let step = core.step(WatchEvent::Polled([Lang::Less].into_iter().collect()));
        assert!(step.commands.is_empty());
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = CoreRuntime::new(full_plan());
        let step = core.step(WatchEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }
}
