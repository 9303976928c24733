//! Configuration management for the reachability service
//!
//! Configuration is loaded from environment variables or a TOML file. The
//! variable names (`PORT`, `BATCH_SIZE`, `SERVER_CALL_TIMEOUT`) match the ones
//! deployments already set for this service.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Probe configuration
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Endpoint source configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Enable CORS for API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 3000,
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

/// Probe configuration
///
/// Both values are signed on purpose. A non-positive batch size disables
/// partitioning and a non-positive timeout disables the per-probe deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum number of servers probed concurrently
    pub batch_size: i64,

    /// Per-probe timeout in milliseconds
    pub server_call_timeout_ms: i64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            server_call_timeout_ms: 5000,
        }
    }
}

impl ProbeConfig {
    pub fn new(batch_size: i64, server_call_timeout_ms: i64) -> Self {
        Self {
            batch_size,
            server_call_timeout_ms,
        }
    }

    /// Per-probe timeout, or `None` when no deadline applies
    #[must_use]
    pub fn server_call_timeout(&self) -> Option<Duration> {
        u64::try_from(self.server_call_timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Batch size as a chunk length, or `None` when the whole list is one batch
    #[must_use]
    pub fn batch_limit(&self) -> Option<usize> {
        usize::try_from(self.batch_size).ok().filter(|n| *n > 0)
    }
}

/// Endpoint source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON file holding the server list; the built-in list is used when unset
    pub servers_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse TOML config file {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read an environment variable and parse it, falling back to `default` when unset
///
/// A variable that is set but does not parse is an error rather than a silent
/// fallback, so a typo in `BATCH_SIZE` fails at startup.
fn env_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(name, format!("{raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.server.host);
        let port = env_or("PORT", defaults.server.port)?;
        let batch_size = env_or("BATCH_SIZE", defaults.probe.batch_size)?;
        let server_call_timeout_ms =
            env_or("SERVER_CALL_TIMEOUT", defaults.probe.server_call_timeout_ms)?;

        let servers_file = std::env::var("SERVERS_FILE").ok().map(PathBuf::from);

        let level = std::env::var("REACHABLE_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("REACHABLE_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                ..defaults.server
            },
            probe: ProbeConfig {
                batch_size,
                server_call_timeout_ms,
            },
            source: SourceConfig { servers_file },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load from `path` when given, otherwise from the environment, and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be greater than 0"));
        }

        self.bind_address()?;

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::invalid(
                    "logging.format",
                    format!("expected \"text\" or \"json\", got {other:?}"),
                ));
            }
        }

        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigError::invalid(
                    "server.host",
                    format!("Invalid address: {}:{}", self.server.host, self.server.port),
                )
            })
    }
}
