//! Configuration for Toolbelt
//!
//! Configuration lives in `~/.toolbelt/config.json`. Every field has a
//! default, so a missing file or a partial file both work; unknown fields are
//! ignored. The `TOOLBELT_API_KEY` environment variable overrides the
//! configured management API key without touching the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ToolbeltError};
use crate::plugins::PluginConfig;
use crate::registry::RegistryConfig;

/// Environment variable overriding `server.api_key`.
pub const API_KEY_ENV: &str = "TOOLBELT_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub plugins: PluginConfig,
    pub registry: RegistryConfig,
}

/// Management API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Whether to attach a permissive CORS layer.
    pub enable_cors: bool,

    /// API key required in the `x-api-key` header. `None` disables auth.
    pub api_key: Option<String>,

    /// Whether per-client rate limiting is enforced.
    pub enable_rate_limit: bool,

    /// Maximum requests per client per one-minute window.
    pub rate_limit_max: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7740,
            enable_cors: false,
            api_key: None,
            enable_rate_limit: true,
            rate_limit_max: 5,
        }
    }
}

impl Config {
    /// Default configuration directory (`~/.toolbelt`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join(".toolbelt")
    }

    /// Default data directory for plugin state (`~/.toolbelt/data`).
    pub fn data_dir() -> PathBuf {
        Self::config_dir().join("data")
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir().join("config.json"))
    }

    /// Load configuration from an explicit path. A missing file yields the
    /// defaults; a present but malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&raw).map_err(|e| {
                ToolbeltError::Config(format!("invalid config at {}: {}", path.display(), e))
            })?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.server.api_key = Some(key);
            }
        }
    }

    /// Write the configuration to its default location, creating the
    /// directory if needed.
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir();
        std::fs::create_dir_all(&dir)?;
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join("config.json"), raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7740);
        assert!(config.server.api_key.is_none());
        assert!(config.server.enable_rate_limit);
        assert_eq!(config.server.rate_limit_max, 5);
        assert!(config.plugins.enabled);
        assert_eq!(config.plugins.hook_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.server.port, 7740);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": 9000}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": 8080, "future": true}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
