// tests/config.rs

use std::io::Write;

use jazzhands::config::{load_and_validate, load_or_default};
use jazzhands::errors::JazzhandsError;
use jazzhands::types::StylesheetMode;
use tempfile::{NamedTempFile, TempDir};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn missing_file_means_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_or_default(dir.path().join("Jazzhands.toml")).unwrap();

    assert_eq!(cfg.project.stylesheet_mode, StylesheetMode::Combine);
    assert_eq!(cfg.watch.poll_interval_ms, 1000);
    assert_eq!(cfg.watch.max_install_retries, 5);
    assert_eq!(cfg.tools.stylus, "node_modules/.bin/stylus");
    assert_eq!(cfg.server.address, "0.0.0.0:8000");
    assert!(cfg.integrations.jsx_registry);
}

#[test]
fn sections_override_defaults() {
    let file = config_file(
        r#"
[project]
package = "mysite"
stylesheet_mode = "exclusive"
search_paths = ["venv/lib/python3.12/site-packages"]

[tools]
lessc = "node_modules/.bin/lessc"

[watch]
poll_interval_ms = 250

[server]
enabled = false
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.project.package.as_deref(), Some(std::path::Path::new("mysite")));
    assert_eq!(cfg.project.stylesheet_mode, StylesheetMode::Exclusive);
    assert_eq!(cfg.project.search_paths.len(), 1);
    assert_eq!(cfg.tools.lessc, "node_modules/.bin/lessc");
    assert_eq!(cfg.tools.npm, "npm");
    assert_eq!(cfg.watch.poll_interval_ms, 250);
    assert_eq!(cfg.watch.exclude, vec!["**/*bundle.js", "**/*bundle.css"]);
    assert!(!cfg.server.enabled);
}

#[test]
fn zero_poll_interval_returns_config_error() {
    let file = config_file("[watch]\npoll_interval_ms = 0\n");

    match load_and_validate(file.path()) {
        Err(JazzhandsError::ConfigError(msg)) => assert!(msg.contains("poll_interval_ms")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_exclude_glob_returns_config_error() {
    let file = config_file("[watch]\nexclude = [\"a/[\"]\n");

    match load_and_validate(file.path()) {
        Err(JazzhandsError::ConfigError(msg)) => assert!(msg.contains("a/[")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_tool_returns_config_error() {
    let file = config_file("[tools]\nbabel = \"\"\n");

    match load_and_validate(file.path()) {
        Err(JazzhandsError::ConfigError(msg)) => assert!(msg.contains("babel")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_stylesheet_mode_fails_to_parse() {
    let file = config_file("[project]\nstylesheet_mode = \"both\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(JazzhandsError::TomlError(_))
    ));
}
