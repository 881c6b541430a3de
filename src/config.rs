//! Configuration management for the analytics backend
//!
//! Supports TOML configuration files with environment variable overrides
//! and sensible defaults. The server binary loads configuration from:
//!
//! 1. The path in the `SMARTLOG_CONFIG` environment variable
//! 2. `./smartlog.toml` in the current directory
//! 3. Built-in defaults
//!
//! Individual values can then be overridden through `SMARTLOG_*` variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::{HttpStoreConfig, RetryPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Document store connection
    #[serde(default)]
    pub store: StoreSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Monitoring and observability
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

/// Document store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Store base URL
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Index holding the log entries
    #[serde(default = "default_index")]
    pub index: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum transport-failure retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_store_url() -> String {
    "http://127.0.0.1:9200".to_string()
}
fn default_index() -> String {
    "smartlog".to_string()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            index: default_index(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Configuration(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the standard locations with env overrides
    pub fn load() -> Result<Self, Error> {
        let mut config = if let Ok(path) = std::env::var("SMARTLOG_CONFIG") {
            Self::from_file(path)?
        } else if Path::new("smartlog.toml").exists() {
            Self::from_file("smartlog.toml")?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `SMARTLOG_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SMARTLOG_STORE_URL") {
            self.store.url = url;
        }
        if let Ok(index) = std::env::var("SMARTLOG_INDEX") {
            self.store.index = index;
        }
        if let Ok(host) = std::env::var("SMARTLOG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SMARTLOG_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(level) = std::env::var("SMARTLOG_LOG_LEVEL") {
            self.monitoring.log_level = level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.store.url.is_empty() {
            return Err(Error::Configuration("store URL cannot be empty".to_string()));
        }
        if self.store.index.is_empty() {
            return Err(Error::Configuration("index name cannot be empty".to_string()));
        }
        // The store rejects upper-case index names at creation time; fail
        // at startup instead.
        if self.store.index.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(Error::Configuration(
                "index name must be lowercase".to_string(),
            ));
        }
        if self.store.request_timeout_ms == 0 {
            return Err(Error::Configuration(
                "request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Derive the HTTP store client configuration
    pub fn http_store_config(&self) -> HttpStoreConfig {
        HttpStoreConfig {
            url: self.store.url.clone(),
            request_timeout: Duration::from_millis(self.store.request_timeout_ms),
            retry_policy: RetryPolicy {
                max_retries: self.store.max_retries,
                ..RetryPolicy::default()
            },
        }
    }

    /// The server listen address as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
