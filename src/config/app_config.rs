use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Defaults read from `~/.config/ssh-fanout/config.toml`. Command-line flags win.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub user: Option<String>,
    pub identity_file: Option<PathBuf>,
    /// Connect timeout, e.g. `"5s"`.
    pub timeout: Option<String>,
}

/**
    read toml format config;
    a missing file yields the defaults
*/
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let config_str = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(ConfigError::ConfigFile {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
    };

    // Check if the config file content is empty
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }

    toml::from_str(&config_str).map_err(|err| ConfigError::ConfigFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
