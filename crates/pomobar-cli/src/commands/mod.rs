pub mod config;
pub mod format;
pub mod ping;
pub mod run;

use std::path::{Path, PathBuf};

use pomobar_core::{Config, ConfigError};

/// Resolve `--config`, falling back to the per-user location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    Config::load_from(&config_path(explicit)?)
}
