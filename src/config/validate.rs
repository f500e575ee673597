// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{JazzhandsError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::JazzhandsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(cfg)?;
    validate_tools(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.poll_interval_ms == 0 {
        return Err(JazzhandsError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    for pattern in cfg.watch.exclude.iter() {
        Glob::new(pattern).map_err(|e| {
            JazzhandsError::ConfigError(format!(
                "[watch].exclude contains an invalid glob '{pattern}': {e}"
            ))
        })?;
    }

    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = &cfg.tools;
    let named = [
        ("python", &tools.python),
        ("npm", &tools.npm),
        ("lessc", &tools.lessc),
        ("stylus", &tools.stylus),
        ("browserify", &tools.browserify),
        ("babel", &tools.babel),
    ];

    for (key, value) in named {
        if value.trim().is_empty() {
            return Err(JazzhandsError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }

    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.address.trim().is_empty() {
        return Err(JazzhandsError::ConfigError(
            "[server].address must not be empty".to_string(),
        ));
    }
    Ok(())
}
