//! Configuration for the sweetshop command line client
//!
//! Sources, later ones winning:
//! - Built-in defaults
//! - Configuration file (`SWEETSHOP_CONFIG_FILE`, else `<config dir>/sweetshop/config.toml`)
//! - Environment variables with the `SWEETSHOP__` prefix, e.g. `SWEETSHOP__SERVER__URL`

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use sweetshop_client::{ClientConfig, DEFAULT_BASE_URL, FileSessionStore};
use tracing::debug;

/// Main configuration struct for the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend connection
    pub server: ServerConfig,

    /// Session persistence
    pub session: SessionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the REST API, including the `/api` prefix
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Accept the admin claim of a locally decoded token when the profile
    /// endpoint is unavailable
    #[serde(default = "default_true")]
    pub trust_token_admin_claim: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Keep the session between invocations
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Session file (default: `<config dir>/sweetshop/session.json`)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            trust_token_admin_claim: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sweetshop").join("config.toml"))
}

impl CliConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SWEETSHOP_CONFIG_FILE")
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path);

        let settings = Self::load_from(config_path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        match config_path {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            Some(path) => debug!("No config file found at {}, using defaults", path.display()),
            None => debug!("No config directory available, using defaults"),
        }

        builder = builder.add_source(
            Environment::with_prefix("SWEETSHOP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.client_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid server configuration: {}", e))?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !self.is_filter_directive() && !valid_levels.contains(&level_lower.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }

    fn is_filter_directive(&self) -> bool {
        self.logging.level.contains('=') || self.logging.level.contains(',')
    }

    /// Get the log filter string for tracing
    pub fn log_filter(&self) -> String {
        if self.is_filter_directive() {
            self.logging.level.clone()
        } else {
            format!(
                "sweetshop={},sweetshop_client={},{}",
                self.logging.level, self.logging.level, self.logging.level
            )
        }
    }

    /// Library configuration derived from the `[server]` section
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .base_url(self.server.url.clone())
            .request_timeout(Duration::from_secs(self.server.request_timeout_secs))
            .connect_timeout(Duration::from_secs(self.server.connect_timeout_secs))
            .trust_token_admin_claim(self.server.trust_token_admin_claim)
            .build()
    }

    /// Where the session file lives
    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session.file {
            Some(path) => Ok(path.clone()),
            None => FileSessionStore::default_path().map_err(anyhow::Error::from),
        }
    }
}
