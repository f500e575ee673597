// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

pub use jazzhands_test_utils::*;

use jazzhands::config::ConfigFile;
use jazzhands::discover::discover_project;
use jazzhands::fs::RealFileSystem;
use jazzhands::pipeline::{Pipeline, PipelineOptions};
use jazzhands::state::ProjectState;

/// Run discovery against a real on-disk tree with a fake backend.
pub async fn discover(tree: &ProjectTree, cfg: &ConfigFile, tools: &mut FakeTools) -> ProjectState {
    discover_project(&RealFileSystem, tools, tree.root(), None, cfg)
        .await
        .expect("discovery should succeed")
}

/// Discovery plus a pipeline wired to `tools`. Keep a clone of `tools` to
/// inspect invocations afterwards.
pub async fn pipeline(
    tree: &ProjectTree,
    cfg: ConfigFile,
    tools: FakeTools,
    options: PipelineOptions,
) -> Pipeline<FakeTools> {
    let mut backend = tools;
    let state = discover(tree, &cfg, &mut backend).await;
    Pipeline::new(state, cfg, options, backend, Arc::new(RealFileSystem))
}
