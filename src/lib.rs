// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod setup;
pub mod state;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{load_or_default, ConfigFile};
use crate::discover::discover_project;
use crate::engine::Runtime;
use crate::errors::Result;
use crate::exec::RealToolBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::setup::{setup_project, BabelConfig};
use crate::state::ProjectState;
use crate::types::{AssetFamily, Lang};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - `setup`, which needs nothing else
/// - project discovery
/// - collect / build stages
/// - dev server and watch loop for `run`
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = config_path(&args.root, &args.config);
    let mut cfg = load_or_default(&config_path)?;
    if let Some(mode) = args.stylesheet_mode {
        cfg.project.stylesheet_mode = mode;
    }
    debug!(path = ?config_path, "configuration loaded");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut backend = RealToolBackend::new();

    if let Some(Command::Setup(setup)) = &args.command {
        let babel = BabelConfig::new(&setup.presets, &setup.transforms);
        if args.dry_run {
            print_setup_dry_run(&args.root, &babel)?;
            return Ok(());
        }
        setup_project(fs.as_ref(), &mut backend, &args.root, &cfg.tools.npm, &babel).await?;
        return Ok(());
    }

    // Absolute root: symlinks created during collection must not depend on
    // the working directory.
    let root = fs.canonicalize(&args.root)?;
    let state = discover_project(
        fs.as_ref(),
        &mut backend,
        &root,
        args.project.as_deref(),
        &cfg,
    )
    .await?;

    if args.dry_run {
        print_dry_run(&state, &cfg);
        return Ok(());
    }

    let stages = args.stages();
    let options = PipelineOptions {
        auto_install: args.auto_install(),
    };
    let launch_server = cfg.server.enabled
        && !matches!(&args.command, Some(Command::Run(run)) if run.no_server);
    let poll_interval = Duration::from_millis(cfg.watch.poll_interval_ms);

    let mut pipeline = Pipeline::new(state, cfg, options, backend, fs);
    pipeline.check_stylesheet_mode()?;

    if stages.collect {
        pipeline.collect_all().await?;
    }
    if stages.build {
        pipeline.build_all().await?;
    }
    if stages.run {
        if launch_server {
            pipeline.launch_dev_server()?;
        }
        Runtime::new(pipeline, poll_interval).run().await?;
    }

    info!("done");
    Ok(())
}

/// A relative `--config` is looked up inside `--root`.
fn config_path(root: &Path, config: &str) -> PathBuf {
    let path = Path::new(config);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn print_setup_dry_run(root: &Path, babel: &BabelConfig) -> Result<()> {
    println!("jazzhands dry-run (setup)");
    println!("  would write {}:", root.join(setup::BABELRC_FILE).display());
    for line in babel.to_json()?.lines() {
        println!("    {line}");
    }
    println!("  would install: {}", babel.npm_packages().join(" "));
    Ok(())
}

/// Print everything discovery found.
///
/// Discovery has already run at this point, including the read-only
/// `sys.path` query when no search paths are configured.
fn print_dry_run(state: &ProjectState, cfg: &ConfigFile) {
    println!("jazzhands dry-run");
    println!("  root = {}", state.layout.root.display());
    println!("  project = {}", state.layout.project_dir.display());
    println!("  manage.py dir = {}", state.layout.manage_dir.display());
    println!("  stylesheet_mode = {:?}", cfg.project.stylesheet_mode);
    println!();

    println!("entry points:");
    for (lang, path) in state.entries.iter() {
        println!("  - {lang}: {}", path.display());
    }

    println!("bundles:");
    for family in [AssetFamily::Css, AssetFamily::Js] {
        match state.bundle_path(family) {
            Some(path) => println!("  - {}", path.display()),
            None => println!("  - {}: no output directory", family.bundle_file_name()),
        }
    }

    println!("packages:");
    for lang in Lang::ALL {
        let packages = state.registry.packages(lang);
        if packages.is_empty() {
            continue;
        }
        println!("  {lang}:");
        for package in packages {
            println!("    - {} ({})", package.name, package.source_dir.display());
        }
    }

    println!("watching {} files", state.watch.total_len());

    debug!("dry-run complete (nothing collected or built)");
}
