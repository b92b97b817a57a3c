//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::claims::TransportConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Claims API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_resource")]
    pub resource: String,

    #[serde(default = "default_create_endpoint")]
    pub create_endpoint: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    TransportConfig::default().base_url
}

fn default_resource() -> String {
    TransportConfig::default().resource
}

fn default_create_endpoint() -> String {
    TransportConfig::default().create_endpoint
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource: default_resource(),
            create_endpoint: default_create_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Query cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,
}

fn default_stale_after() -> u64 {
    300 // 5 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after(),
        }
    }
}

impl CacheConfig {
    pub fn stale_after(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.stale_after_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let (config, errors) = Self::discover();
        for e in errors {
            tracing::warn!("{}; using defaults for that file", e);
        }
        config
    }

    /// Load from the first default location that parses, falling back to
    /// environment-only config. Files that exist but fail to load are
    /// returned alongside, so callers can report them once logging is up.
    pub fn discover() -> (Self, Vec<ConfigError>) {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("claimdesk").join("config.toml")),
            Some(PathBuf::from("/etc/claimdesk/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::discover_in(&config_paths)
    }

    fn discover_in(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    return (config, errors);
                }
                Err(e) => errors.push(e),
            }
        }

        (Self::from_env(), errors)
    }

    /// Transport settings derived from the `[api]` section
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::from(&self.api)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(url) = var("CLAIMDESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(resource) = var("CLAIMDESK_API_RESOURCE") {
            self.api.resource = resource;
        }
        if let Some(endpoint) = var("CLAIMDESK_CREATE_ENDPOINT") {
            self.api.create_endpoint = endpoint;
        }

        // Logging overrides
        if let Some(level) = var("CLAIMDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CLAIMDESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Claim Desk Configuration
#
# Environment variables override these settings:
# - CLAIMDESK_API_URL
# - CLAIMDESK_API_RESOURCE
# - CLAIMDESK_CREATE_ENDPOINT
# - CLAIMDESK_LOG_LEVEL
# - CLAIMDESK_LOG_FORMAT

[api]
# Base URL of the claims API
base_url = "{base_url}"

# Resource path shared by all endpoints
resource = "{resource}"

# Endpoint under the resource that accepts new claims
create_endpoint = "{create_endpoint}"

# Request timeout in seconds
request_timeout_secs = {timeout}

[cache]
# Cached claim queries are refetched after this many seconds
stale_after_secs = {stale_after}

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        base_url = default_base_url(),
        resource = default_resource(),
        create_endpoint = default_create_endpoint(),
        timeout = default_request_timeout(),
        stale_after = default_stale_after(),
    )
}
