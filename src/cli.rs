// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::StylesheetMode;

/// Command-line arguments for `jazzhands`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jazzhands",
    version,
    about = "Collect, build and watch the frontend assets of a Python web project.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). A missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = "Jazzhands.toml")]
    pub config: String,

    /// Workspace root holding the project package, `node_modules` and
    /// `.babelrc`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Project package directory, skipping detection via `settings`.
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Override `[project].stylesheet_mode` (combine or exclusive).
    #[arg(long, value_name = "MODE")]
    pub stylesheet_mode: Option<StylesheetMode>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JAZZHANDS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Discover and print what would be collected and built, without
    /// touching anything.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// One-time setup: write `.babelrc` and install the transpiler toolchain.
    Setup(SetupArgs),
    /// Copy or link package assets into the project.
    Collect,
    /// Collect, then build `bundle.css` and `bundle.js`.
    Build,
    /// Collect, build, start the dev server and rebuild on changes.
    Run(RunArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SetupArgs {
    /// Babel preset to install and enable (repeatable). Default: es2017.
    #[arg(short = 'p', long = "preset", value_name = "NAME")]
    pub presets: Vec<String>,

    /// Babel transform plugin to install and enable (repeatable).
    #[arg(short = 't', long = "transform", value_name = "NAME")]
    pub transforms: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Experimental: `npm install` modules the bundler reports missing, then
    /// retry the build.
    #[arg(long)]
    pub auto_npm: bool,

    /// Do not launch the backend development server.
    #[arg(long)]
    pub no_server: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Which stages a command enables. `build` implies `collect`; `run` implies
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stages {
    pub collect: bool,
    pub build: bool,
    pub run: bool,
}

impl CliArgs {
    pub fn stages(&self) -> Stages {
        match &self.command {
            None | Some(Command::Build) => Stages {
                collect: true,
                build: true,
                run: false,
            },
            Some(Command::Collect) => Stages {
                collect: true,
                ..Stages::default()
            },
            Some(Command::Run(_)) => Stages {
                collect: true,
                build: true,
                run: true,
            },
            Some(Command::Setup(_)) => Stages::default(),
        }
    }

    /// `--auto-npm` only exists on `run`.
    pub fn auto_install(&self) -> bool {
        matches!(&self.command, Some(Command::Run(run)) if run.auto_npm)
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_collects_and_builds() {
        let args = CliArgs::try_parse_from(["jazzhands"]).unwrap();
        assert_eq!(
            args.stages(),
            Stages {
                collect: true,
                build: true,
                run: false
            }
        );
        assert!(!args.auto_install());
    }

    #[test]
    fn run_accepts_auto_npm() {
        let args = CliArgs::try_parse_from(["jazzhands", "run", "--auto-npm"]).unwrap();
        assert!(args.stages().run);
        assert!(args.auto_install());
    }

    #[test]
    fn setup_options_are_repeatable() {
        let args = CliArgs::try_parse_from([
            "jazzhands", "setup", "-p", "react", "--preset", "es2015", "-t", "class-properties",
        ])
        .unwrap();
        match args.command {
            Some(Command::Setup(setup)) => {
                assert_eq!(setup.presets, vec!["react", "es2015"]);
                assert_eq!(setup.transforms, vec!["class-properties"]);
            }
            other => panic!("expected setup, got {other:?}"),
        }
    }

    #[test]
    fn stylesheet_mode_override() {
        let args = CliArgs::try_parse_from(["jazzhands", "--stylesheet-mode", "exclusive", "build"]).unwrap();
        assert_eq!(args.stylesheet_mode, Some(StylesheetMode::Exclusive));
        assert!(CliArgs::try_parse_from(["jazzhands", "--stylesheet-mode", "both"]).is_err());
    }

    #[test]
    fn auto_npm_is_rejected_outside_run() {
        assert!(CliArgs::try_parse_from(["jazzhands", "build", "--auto-npm"]).is_err());
    }
}
