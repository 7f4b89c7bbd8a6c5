use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::store::DEFAULT_FILE;
use crate::model::config::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TODO_CONFIG";
/// Environment variable naming the task document
pub const FILE_ENV: &str = "TODO_FILE";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `<config_dir>/todos/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("todos").join("config.toml"))
}

/// Load the config. An explicit path must exist; the default location is
/// optional and falls back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(Config::default()),
        },
    }
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Pick the task document: flag, then config, then `todos.json` in the
/// working directory. The env var arrives through the flag (clap `env`).
pub fn resolve_task_file(flag: Option<&Path>, config: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.storage.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
}
