use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

const APP_DIR: &str = "ticklist";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no home directory: set HOME or pass --data-dir / --config")]
    NoHome,
}

/// Read the config file at `path`. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `$XDG_CONFIG_HOME/ticklist/config.toml`, falling back to `~/.config`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(xdg_dir("XDG_CONFIG_HOME", ".config")?
        .join(APP_DIR)
        .join("config.toml"))
}

/// `$XDG_DATA_HOME/ticklist`, falling back to `~/.local/share`
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    Ok(xdg_dir("XDG_DATA_HOME", ".local/share")?.join(APP_DIR))
}

/// Data directory: command-line override, then config, then platform default
pub fn resolve_data_dir(
    config: &AppConfig,
    cli_override: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = cli_override {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &config.storage.data_dir {
        return Ok(dir.clone());
    }
    default_data_dir()
}

/// Log directory: config, then `<data_dir>/logs`
pub fn resolve_log_dir(config: &AppConfig, data_dir: &Path) -> PathBuf {
    config
        .log
        .dir
        .clone()
        .unwrap_or_else(|| data_dir.join("logs"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(home_fallback))
}
