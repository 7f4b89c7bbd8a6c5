use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub drive: DriveConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Task document. Relative paths resolve against the working directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Used when a remote command is given `-` as its URL
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: None,
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default: 30
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// OAuth client file downloaded from the Google Cloud console
    pub credentials_file: PathBuf,
    /// Cached access/refresh token
    pub token_file: PathBuf,
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Where the TUI writes its log (the terminal is busy). Default: temp dir.
    pub log_file: Option<PathBuf>,
    /// tracing filter directive, e.g. "info" or "todos=debug"
    pub log_level: Option<String>,
    /// Color overrides keyed by theme slot name, values as `#RRGGBB`
    pub colors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.storage.path.is_none());
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.drive.credentials_file, PathBuf::from("credentials.json"));
        assert_eq!(config.drive.token_file, PathBuf::from("token.json"));
        assert!(config.ui.colors.is_empty());
    }

    #[test]
    fn partial_sections() {
        let config: Config = toml::from_str(
            r##"
[remote]
url = "http://example.com"
timeout_secs = 5

[ui.colors]
highlight = "#112233"
"##,
        )
        .unwrap();
        assert_eq!(config.remote.url.as_deref(), Some("http://example.com"));
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.remote.username, "");
        assert_eq!(config.ui.colors.get("highlight").map(String::as_str), Some("#112233"));
    }
}
