// tests/collect.rs

mod common;
use crate::common::{init_tracing, pipeline, ConfigFileBuilder, FakeTools, ProjectTree};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use jazzhands::discover::discover_project;
use jazzhands::errors::JazzhandsError;
use jazzhands::fs::mock::MockFileSystem;
use jazzhands::pipeline::{copy_tree, pull_app_assets, Pipeline, PipelineOptions};
use jazzhands::types::Lang;

fn tree_with_packages() -> ProjectTree {
    ProjectTree::django("mysite")
        .file("site/widgets/static/js/index.js", "import x from './x';")
        .file("site/widgets/static/js/lib/x.js", "export default 1;")
        .file("site/widgets/static/js/README.md", "docs")
        .file("site/widgets/static/less/index.less", "@c: red;")
        .file("site/charts/static/stylus/index.styl", "c = red")
        .file("mysite/static/js/index.js", "import 'widgets';")
        .file("mysite/static/less/index.less", "@import 'widgets/index';")
        .file("mysite/static/stylus/index.styl", "@import 'charts'")
        .dir("mysite/static/css")
}

fn cfg_for(tree: &ProjectTree) -> jazzhands::config::ConfigFile {
    ConfigFileBuilder::new()
        .search_path(tree.path("site"))
        .jsx_registry(false)
        .build()
}

#[tokio::test]
async fn nothing_to_collect_leaves_state_untouched() {
    init_tracing();
    let tree = ProjectTree::django("mysite").file("mysite/static/js/index.js", "");
    let cfg = ConfigFileBuilder::new().search_path(tree.path("mysite")).build();
    let tools = FakeTools::new();

    let mut pipeline = pipeline(&tree, cfg, tools.clone(), PipelineOptions::default()).await;
    let watched_before = pipeline.state().watch.total_len();

    pipeline.collect(Lang::Js).await.unwrap();
    pipeline.collect(Lang::Less).await.unwrap();

    assert_eq!(pipeline.state().watch.total_len(), watched_before);
    assert!(!tree.exists("node_modules"));
    assert!(tools.invocations_of("babel").is_empty());
}

#[tokio::test]
async fn stylesheets_are_linked_next_to_their_entry() {
    let tree = tree_with_packages();
    let tools = FakeTools::new();
    let mut pipeline = pipeline(&tree, cfg_for(&tree), tools, PipelineOptions::default()).await;

    pipeline.collect(Lang::Less).await.unwrap();
    pipeline.collect(Lang::Styl).await.unwrap();

    assert!(tree.is_symlink("mysite/static/less/widgets"));
    assert_eq!(
        fs::read_link(tree.path("mysite/static/less/widgets")).unwrap(),
        tree.path("site/widgets/static/less")
    );
    assert!(tree.is_symlink("mysite/static/stylus/charts"));
    assert_eq!(tree.read("mysite/static/stylus/charts/index.styl"), "c = red");
}

#[tokio::test]
async fn relinking_replaces_the_previous_link() {
    let tree = tree_with_packages().dir("mysite/static/less/widgets/stale");
    let mut pipeline = pipeline(&tree, cfg_for(&tree), FakeTools::new(), PipelineOptions::default()).await;

    pipeline.collect(Lang::Less).await.unwrap();
    pipeline.collect(Lang::Less).await.unwrap();

    assert!(tree.is_symlink("mysite/static/less/widgets"));
    assert!(!tree.exists("mysite/static/less/widgets/stale"));
}

#[tokio::test]
async fn javascript_is_copied_into_node_modules_and_transpiled() {
    let tree = tree_with_packages();
    let tools = FakeTools::new();
    let mut pipeline = pipeline(&tree, cfg_for(&tree), tools.clone(), PipelineOptions::default()).await;

    pipeline.collect(Lang::Js).await.unwrap();

    assert!(!tree.is_symlink("node_modules/widgets"));
    assert_eq!(tree.read("node_modules/widgets/lib/x.js"), "export default 1;");
    assert_eq!(tree.read("node_modules/widgets/README.md"), "docs");

    let babel_targets: Vec<Vec<String>> = tools
        .invocations_of("babel")
        .into_iter()
        .map(|inv| inv.args)
        .collect();
    let index = tree.path("node_modules/widgets/index.js").display().to_string();
    let x = tree.path("node_modules/widgets/lib/x.js").display().to_string();
    assert_eq!(
        babel_targets,
        vec![
            vec![index.clone(), "-o".to_string(), index],
            vec![x.clone(), "-o".to_string(), x],
        ]
    );

    // Package sources are watched where they live.
    assert!(pipeline
        .state()
        .watch
        .last_seen(Lang::Js, &tree.path("site/widgets/static/js/lib/x.js"))
        .is_some());
}

#[tokio::test]
async fn missing_babel_is_fatal_with_setup_hint() {
    let tree = tree_with_packages();
    let tools = FakeTools::new().with_missing("babel");
    let mut pipeline = pipeline(&tree, cfg_for(&tree), tools, PipelineOptions::default()).await;

    let err = pipeline.collect(Lang::Js).await.unwrap_err();
    match err {
        JazzhandsError::ToolMissing { tool, hint, .. } => {
            assert_eq!(tool, "babel");
            assert!(hint.contains("jazzhands setup"));
        }
        other => panic!("Expected ToolMissing, got: {other:?}"),
    }
}

#[tokio::test]
async fn collect_all_skips_css_without_a_destination() {
    let tree = ProjectTree::django("mysite")
        .file("site/widgets/static/less/index.less", "")
        .file("mysite/static/less/index.less", "");
    let mut pipeline = pipeline(&tree, cfg_for(&tree), FakeTools::new(), PipelineOptions::default()).await;

    pipeline.collect_all().await.unwrap();

    assert!(!tree.exists("mysite/static/less/widgets"));
}

#[tokio::test]
async fn jsx_registry_is_compiled_when_django_jsx_is_importable() {
    let tree = tree_with_packages();
    let cfg = ConfigFileBuilder::new().search_path(tree.path("site")).build();
    let registry = tree.path("mysite/static/js/jsx_registry.js");
    let written = registry.clone();
    let tools = FakeTools::new().on("python", move |inv| {
        if inv.args.iter().any(|a| a == "compilejsx") {
            fs::write(&written, "export default {};").unwrap();
        }
        common::ok("")
    });

    let mut pipeline = pipeline(&tree, cfg, tools.clone(), PipelineOptions::default()).await;
    pipeline.collect_all().await.unwrap();

    let compile = tools
        .invocations_of("python")
        .into_iter()
        .find(|inv| inv.args.iter().any(|a| a == "compilejsx"))
        .expect("compilejsx should run");
    assert_eq!(compile.cwd.as_deref(), Some(tree.root()));
    assert_eq!(compile.args.last().unwrap(), &registry.display().to_string());

    let transpiled_registry = tools
        .invocations_of("babel")
        .iter()
        .any(|inv| inv.args.first() == Some(&registry.display().to_string()));
    assert!(transpiled_registry);
}

#[tokio::test]
async fn jsx_registry_is_found_through_the_pipeline_filesystem() {
    let fs = MockFileSystem::new();
    fs.add_file("/w/manage.py", "");
    fs.add_file("/w/mysite/settings.py", "");
    fs.add_file("/w/mysite/static/js/index.js", "");
    fs.add_dir("/w/site");
    let cfg = ConfigFileBuilder::new().search_path("/w/site").build();

    let written = fs.clone();
    let mut tools = FakeTools::new().on("python", move |inv| {
        if inv.args.iter().any(|a| a == "compilejsx") {
            written.add_file("/w/mysite/static/js/jsx_registry.js", "export default {};");
        }
        common::ok("")
    });

    let state = discover_project(&fs, &mut tools, Path::new("/w"), None, &cfg)
        .await
        .unwrap();
    let mut pipeline = Pipeline::new(state, cfg, PipelineOptions::default(), tools.clone(), Arc::new(fs));
    pipeline.collect_all().await.unwrap();

    let babel: Vec<Vec<String>> = tools.invocations_of("babel").into_iter().map(|inv| inv.args).collect();
    let registry = "/w/mysite/static/js/jsx_registry.js".to_string();
    assert_eq!(babel, vec![vec![registry.clone(), "-o".to_string(), registry]]);
    assert!(pipeline
        .state()
        .watch
        .last_seen(Lang::Js, Path::new("/w/mysite/static/js/jsx_registry.js"))
        .is_some());
}

#[tokio::test]
async fn jsx_registry_is_skipped_without_django_jsx() {
    let tree = tree_with_packages();
    let cfg = ConfigFileBuilder::new().search_path(tree.path("site")).build();
    let tools = FakeTools::new().respond("python", common::fail(1, "ModuleNotFoundError: django_jsx"));

    let mut pipeline = pipeline(&tree, cfg, tools.clone(), PipelineOptions::default()).await;
    pipeline.collect_all().await.unwrap();

    assert!(tools
        .invocations_of("python")
        .iter()
        .all(|inv| !inv.args.iter().any(|a| a == "compilejsx")));
    assert!(!tree.exists("mysite/static/js/jsx_registry.js"));
}

#[test]
fn pull_app_assets_replaces_a_copied_directory_with_a_link() {
    let tree = ProjectTree::new()
        .file("from/a.less", "a")
        .file("to/old.less", "old");

    pull_app_assets(&tree.path("from"), &tree.path("to"), false).unwrap();

    assert!(tree.is_symlink("to"));
    assert_eq!(tree.read("to/a.less"), "a");
    assert!(!tree.exists("to/old.less"));
}

#[test]
fn copy_tree_copies_nested_files() {
    let tree = ProjectTree::new()
        .file("src/a.js", "a")
        .file("src/nested/deeper/b.js", "b");

    let copied = copy_tree(&tree.path("src"), &tree.path("dst")).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(tree.read("dst/nested/deeper/b.js"), "b");
}
