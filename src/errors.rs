// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JazzhandsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(
        "could not locate your project's main package in {0}; jazzhands looks for a \
         directory containing a `settings` package or `settings.py` module"
    )]
    ProjectNotFound(String),

    #[error("{tool} is required but not installed ({program})\n{hint}")]
    ToolMissing {
        tool: String,
        program: String,
        hint: String,
    },

    #[error("refusing to overwrite existing {0}; please update it manually")]
    WouldOverwrite(String),

    #[error(
        "found Less or Stylus files, but no obvious location to generate bundle.css \
         (expected a .../static/css/ directory somewhere in the project)"
    )]
    NoCssDestination,

    #[error("I don't know how to combine Stylus and Less in a single build (stylesheet_mode = \"exclusive\")")]
    MixedStylesheets,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JazzhandsError>;
