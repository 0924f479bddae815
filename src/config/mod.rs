//! Gateway configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional JSON config file (`--config path`)
//! 3. Environment variables
//!
//! The API key comes from the environment only; a config file that names
//! one is rejected.

use std::fs;
use std::path::Path;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

pub const ENV_API_KEY: &str = "HONEYCOMB_API_KEY";
pub const ENV_API_URL: &str = "HONEYCOMB_API_URL";
pub const ENV_API_VERSION: &str = "HONEYCOMB_API_VERSION";
pub const ENV_LOG_LEVEL: &str = "HONEYCOMB_GATEWAY_LOG";

pub const DEFAULT_BASE_URL: &str = "https://api.honeycomb.io";
pub const DEFAULT_API_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("HONEYCOMB_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON in {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of the optional config file; every field may be omitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub http: Option<HttpServerConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Resolved configuration, read-only after startup
#[derive(Clone, PartialEq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub log_level: Severity,
    pub http: HttpServerConfig,
}

// The key is redacted so configs can be logged
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("log_level", &self.log_level)
            .field("http", &self.http)
            .finish()
    }
}

impl GatewayConfig {
    /// Load from the process environment and an optional file
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub fn from_sources<F>(file: FileConfig, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let api_key = env(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let base_url = env(ENV_API_URL)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_version = env(ENV_API_VERSION)
            .or(file.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let log_level = match env(ENV_LOG_LEVEL).or(file.log_level) {
            Some(level) => level.parse().map_err(|reason| ConfigError::Invalid {
                field: "log_level",
                reason,
            })?,
            None => Severity::Info,
        };

        let config = Self {
            api_key: api_key.trim().to_string(),
            base_url,
            api_version: api_version.trim_matches('/').to_string(),
            log_level,
            http: file.http.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            field: "base_url",
            reason: format!("'{}': {}", self.base_url, e),
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(ConfigError::Invalid {
                field: "api_version",
                reason: format!("'{}' must be a single path segment", self.api_version),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_sources(
            FileConfig::default(),
            env(&[(ENV_API_KEY, "hcaik_test")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "hcaik_test");
        assert_eq!(config.base_url, "https://api.honeycomb.io");
        assert_eq!(config.api_version, "1");
        assert_eq!(config.log_level, Severity::Info);
        assert_eq!(config.http, HttpServerConfig::default());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = GatewayConfig::from_sources(FileConfig::default(), env(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);

        let err = GatewayConfig::from_sources(FileConfig::default(), env(&[(ENV_API_KEY, "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            base_url: Some("https://api.eu1.honeycomb.io".into()),
            api_version: Some("2".into()),
            ..Default::default()
        };
        let config = GatewayConfig::from_sources(
            file,
            env(&[(ENV_API_KEY, "k"), (ENV_API_VERSION, "1")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.eu1.honeycomb.io");
        assert_eq!(config.api_version, "1");
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gateway.json");
        fs::write(
            &path,
            r#"{"log_level": "warn", "http": {"port": 9000}}"#,
        )
        .unwrap();

        let file = FileConfig::load(&path).unwrap();
        let config = GatewayConfig::from_sources(file, env(&[(ENV_API_KEY, "k")])).unwrap();
        assert_eq!(config.log_level, Severity::Warn);
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "127.0.0.1");
    }

    #[test]
    fn test_file_may_not_carry_api_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gateway.json");
        fs::write(&path, r#"{"api_key": "leaked"}"#).unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/gateway.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = GatewayConfig::from_sources(
            FileConfig::default(),
            env(&[(ENV_API_KEY, "k"), (ENV_API_URL, "ftp://example.com")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));

        let err = GatewayConfig::from_sources(
            FileConfig::default(),
            env(&[(ENV_API_KEY, "k"), (ENV_API_VERSION, "1/2")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api_version", .. }));

        let err = GatewayConfig::from_sources(
            FileConfig::default(),
            env(&[(ENV_API_KEY, "k"), (ENV_LOG_LEVEL, "chatty")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "log_level", .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config =
            GatewayConfig::from_sources(FileConfig::default(), env(&[(ENV_API_KEY, "secret")]))
                .unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
