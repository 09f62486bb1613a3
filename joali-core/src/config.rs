//! Configuration management for joali
//!
//! Config files are stored in platform-appropriate locations:
//! - Linux: ~/.config/joali/
//! - macOS: ~/Library/Application Support/joali/
//! - Windows: %APPDATA%\joali\
//!
//! The session file defaults to the platform data directory.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding `api.api_key`
pub const API_KEY_ENV: &str = "JOALI_API_KEY";

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "JOALI_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoDirFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Application key sent as `apiKey` on endpoints that require it
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "[REDACTED]" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file location (defaults to the data directory)
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    crate::DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}


impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("joali"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Session file path: configured value, else `<data dir>/joali/session.json`
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.session.path {
            return Ok(path.clone());
        }
        dirs::data_local_dir()
            .map(|p| p.join("joali").join("session.json"))
            .ok_or(ConfigError::NoDirFound)
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `JOALI_BASE_URL` / `JOALI_API_KEY` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    fn with_overrides(mut self, base_url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api.api_key = key;
        }
        self
    }
}
