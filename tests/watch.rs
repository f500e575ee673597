// tests/watch.rs

mod common;
use crate::common::{init_tracing, ok, pipeline, with_timeout, ConfigFileBuilder, FakeTools, ProjectTree};

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

use jazzhands::engine::{CoreCommand, Runtime, WatchPhase};
use jazzhands::fs::mock::{initial_mtime, MockFileSystem};
use jazzhands::pipeline::PipelineOptions;
use jazzhands::types::Lang;
use jazzhands::watch::{ExcludeSet, WatchTable};

fn touch(path: &Path, secs_ahead: u64) {
    let file = File::options().write(true).open(path).expect("open for touch");
    file.set_modified(SystemTime::now() + Duration::from_secs(secs_ahead))
        .expect("set mtime");
}

fn full_tree() -> ProjectTree {
    ProjectTree::django("mysite")
        .file("mysite/static/js/index.js", "")
        .file("mysite/static/js/bundle.js", "")
        .file("mysite/static/less/index.less", "")
        .file("mysite/static/css/bundle.css", "")
}

#[tokio::test]
async fn rewriting_bundles_never_triggers_a_rebuild() {
    init_tracing();
    let tree = full_tree();
    let tools = FakeTools::new();
    let pipeline = pipeline(&tree, ConfigFileBuilder::new().build(), tools.clone(), PipelineOptions::default()).await;
    let mut runtime = Runtime::new(pipeline, Duration::from_millis(10));

    touch(&tree.path("mysite/static/js/bundle.js"), 60);
    touch(&tree.path("mysite/static/css/bundle.css"), 60);

    let step = runtime.tick().await.unwrap();

    assert!(step.commands.is_empty());
    assert!(step.keep_running);
    assert!(tools.invocations_of("browserify").is_empty());
    assert_eq!(runtime.core().phase(), WatchPhase::Idle);
}

#[tokio::test]
async fn rewriting_a_prefixed_bundle_never_triggers_a_rebuild() {
    let tree = full_tree().file("mysite/static/js/vendor.bundle.js", "");
    let tools = FakeTools::new();
    let pipeline = pipeline(&tree, ConfigFileBuilder::new().build(), tools.clone(), PipelineOptions::default()).await;
    let mut runtime = Runtime::new(pipeline, Duration::from_millis(10));

    touch(&tree.path("mysite/static/js/vendor.bundle.js"), 60);
    let step = runtime.tick().await.unwrap();

    assert!(step.commands.is_empty());
    assert!(tools.invocations_of("browserify").is_empty());
}

#[tokio::test]
async fn js_edit_recollects_and_rebuilds_scripts_only() {
    let tree = full_tree();
    let tools = FakeTools::new();
    let pipeline = pipeline(&tree, ConfigFileBuilder::new().build(), tools.clone(), PipelineOptions::default()).await;
    let mut runtime = Runtime::new(pipeline, Duration::from_millis(10));

    touch(&tree.path("mysite/static/js/index.js"), 60);
    let step = runtime.tick().await.unwrap();

    assert_eq!(
        step.commands,
        vec![CoreCommand::Collect(Lang::Js), CoreCommand::BuildScripts]
    );
    assert_eq!(tools.invocations_of("browserify").len(), 1);
    assert!(tools.invocations_of("lessc").is_empty());

    // The same timestamp is not a change twice.
    let step = runtime.tick().await.unwrap();
    assert!(step.commands.is_empty());
}

#[tokio::test]
async fn less_edit_rebuilds_the_stylesheet_bundle() {
    let tree = full_tree();
    let tools = FakeTools::new();
    let pipeline = pipeline(&tree, ConfigFileBuilder::new().build(), tools.clone(), PipelineOptions::default()).await;
    let mut runtime = Runtime::new(pipeline, Duration::from_millis(10));

    touch(&tree.path("mysite/static/less/index.less"), 60);
    let step = runtime.tick().await.unwrap();

    assert_eq!(
        step.commands,
        vec![CoreCommand::Collect(Lang::Less), CoreCommand::BuildStylesheets]
    );
    assert_eq!(tools.invocations_of("lessc").len(), 1);
    assert!(tools.invocations_of("browserify").is_empty());
}

#[tokio::test]
async fn run_until_stops_on_shutdown() {
    let tree = full_tree();
    let tools = FakeTools::new().respond("browserify", ok(""));
    let pipeline = pipeline(&tree, ConfigFileBuilder::new().build(), tools, PipelineOptions::default()).await;
    let runtime = Runtime::new(pipeline, Duration::from_millis(5));

    let shutdown = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<(), std::io::Error>(())
    };

    let pipeline = with_timeout(runtime.run_until(shutdown)).await.unwrap();
    assert_eq!(pipeline.state().watch.len(Lang::Js), 1);
}

#[test]
fn vanished_files_are_forgotten() {
    let fs = MockFileSystem::new();
    fs.add_file("/w/app/a.js", "");
    fs.add_file("/w/app/b.styl", "");

    let mut table = WatchTable::default();
    table.record_from_fs(&fs, Path::new("/w/app/a.js")).unwrap();
    table.record_from_fs(&fs, Path::new("/w/app/b.styl")).unwrap();
    assert_eq!(table.total_len(), 2);

    fs.remove("/w/app/a.js");
    fs.set_modified("/w/app/b.styl", initial_mtime() + Duration::from_secs(1));

    let changes = table.poll(&fs);
    assert!(changes.contains(Lang::Styl));
    assert!(!changes.contains(Lang::Js));
    assert_eq!(table.len(Lang::Js), 0);
}

#[test]
fn excluded_paths_are_never_recorded() {
    let fs = MockFileSystem::new();
    fs.add_file("/w/app/static/js/bundle.js", "");
    fs.add_file("/w/app/vendor/jquery.js", "");
    fs.add_file("/w/app/main.js", "");

    let exclude = ExcludeSet::new(
        "/w",
        &["**/bundle.js".to_string(), "app/vendor/**".to_string()],
    )
    .unwrap();
    let mut table = WatchTable::new(exclude);

    for path in ["/w/app/static/js/bundle.js", "/w/app/vendor/jquery.js", "/w/app/main.js"] {
        table.record_from_fs(&fs, Path::new(path)).unwrap();
    }

    assert_eq!(table.len(Lang::Js), 1);
    assert!(table.last_seen(Lang::Js, Path::new("/w/app/main.js")).is_some());
}
