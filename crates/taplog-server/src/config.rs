//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// TCP ingestion socket settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Web UI / WebSocket settings.
    #[serde(default)]
    pub web: WebConfig,

    /// On-disk storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the TCP ingestion listener.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port senders connect to.
    #[serde(default = "default_ingest_port")]
    pub port: u16,
}

/// Network configuration for the HTTP/WebSocket server.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port the viewer UI is served on.
    #[serde(default = "default_web_port")]
    pub port: u16,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for per-connection log files (created at startup).
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Directory holding the viewer page and script.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "taplog_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_ingest_port() -> u16 {
    18194
}

fn default_web_port() -> u16 {
    3000
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_ingest_port(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_web_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `TAPLOG_INGEST_HOST` / `TAPLOG_INGEST_PORT` override the ingest socket
/// - `TAPLOG_WEB_HOST` / `TAPLOG_WEB_PORT` override the web socket
/// - `TAPLOG_LOG_DIR` overrides `storage.log_dir`
/// - `TAPLOG_STATIC_DIR` overrides `storage.static_dir`
/// - `TAPLOG_LOG_LEVEL` overrides `logging.level`
/// - `TAPLOG_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("TAPLOG_INGEST_HOST") {
        if let Ok(parsed) = host.parse() {
            config.ingest.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("TAPLOG_INGEST_PORT") {
        if let Ok(parsed) = port.parse() {
            config.ingest.port = parsed;
        }
    }
    if let Ok(host) = std::env::var("TAPLOG_WEB_HOST") {
        if let Ok(parsed) = host.parse() {
            config.web.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("TAPLOG_WEB_PORT") {
        if let Ok(parsed) = port.parse() {
            config.web.port = parsed;
        }
    }
    if let Ok(log_dir) = std::env::var("TAPLOG_LOG_DIR") {
        config.storage.log_dir = log_dir;
    }
    if let Ok(static_dir) = std::env::var("TAPLOG_STATIC_DIR") {
        config.storage.static_dir = static_dir;
    }
    if let Ok(level) = std::env::var("TAPLOG_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("TAPLOG_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
