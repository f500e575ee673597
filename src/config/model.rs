// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::StylesheetMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// package = "mysite"
/// stylesheet_mode = "combine"
///
/// [tools]
/// lessc = "node_modules/.bin/lessc"
///
/// [watch]
/// poll_interval_ms = 500
///
/// [server]
/// address = "127.0.0.1:8000"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub integrations: IntegrationsSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`
/// (or `Default`, which is valid by construction).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub project: ProjectSection,
    pub tools: ToolsSection,
    pub watch: WatchSection,
    pub server: ServerSection,
    pub integrations: IntegrationsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            project: raw.project,
            tools: raw.tools,
            watch: raw.watch,
            server: raw.server,
            integrations: raw.integrations,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Main package directory relative to the root. `None` means detect it
    /// by looking for `settings` / `settings.py`.
    #[serde(default)]
    pub package: Option<PathBuf>,

    #[serde(default)]
    pub stylesheet_mode: StylesheetMode,

    /// Directories searched for installed packages. Empty means "ask the
    /// Python interpreter for `sys.path`".
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Directory names never descended into while looking for packages.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_exclude_dirs() -> Vec<String> {
    vec![".tox".to_string(), "node_modules".to_string(), ".git".to_string()]
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            package: None,
            stylesheet_mode: StylesheetMode::default(),
            search_paths: Vec::new(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// `[tools]` section: external programs jazzhands drives.
///
/// Values containing a path separator are resolved against the workspace
/// root; bare names are looked up on `PATH`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_npm")]
    pub npm: String,

    #[serde(default = "default_lessc")]
    pub lessc: String,

    #[serde(default = "default_stylus")]
    pub stylus: String,

    #[serde(default = "default_browserify")]
    pub browserify: String,

    #[serde(default = "default_babel")]
    pub babel: String,
}

fn default_python() -> String {
    "python".to_string()
}

fn default_npm() -> String {
    "npm".to_string()
}

fn default_lessc() -> String {
    "lessc".to_string()
}

fn default_stylus() -> String {
    "node_modules/.bin/stylus".to_string()
}

fn default_browserify() -> String {
    "node_modules/.bin/browserify".to_string()
}

fn default_babel() -> String {
    "node_modules/.bin/babel".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            python: default_python(),
            npm: default_npm(),
            lessc: default_lessc(),
            stylus: default_stylus(),
            browserify: default_browserify(),
            babel: default_babel(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Sleep between two polls of the watch table.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Globs for files that must never trigger a rebuild. Generated bundles
    /// are listed by default so a build never re-triggers itself.
    #[serde(default = "default_watch_exclude")]
    pub exclude: Vec<String>,

    /// Upper bound on `npm install` attempts for one `--auto-npm` build.
    #[serde(default = "default_max_install_retries")]
    pub max_install_retries: usize,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_watch_exclude() -> Vec<String> {
    vec!["**/*bundle.js".to_string(), "**/*bundle.css".to_string()]
}

fn default_max_install_retries() -> usize {
    5
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            exclude: default_watch_exclude(),
            max_install_retries: default_max_install_retries(),
        }
    }
}

/// `[server]` section: the backend development server started by `run`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_address")]
    pub address: String,
}

fn default_true() -> bool {
    true
}

fn default_address() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            address: default_address(),
        }
    }
}

/// `[integrations]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationsSection {
    /// Run `manage.py compilejsx` before collecting JS when `django_jsx` is
    /// importable.
    #[serde(default = "default_true")]
    pub jsx_registry: bool,
}

impl Default for IntegrationsSection {
    fn default() -> Self {
        Self { jsx_registry: true }
    }
}
