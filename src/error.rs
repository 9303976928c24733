//! Unified error handling for the reachable crate
//!
//! Domain-specific errors live next to the code that raises them
//! ([`SourceError`] in the endpoint source, [`ConfigError`] in config) and are
//! folded into the single [`Error`] enum at module boundaries.
//!
//! Probe failures never show up here. A server that cannot be reached is
//! simply left out of the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reachable::error::{Error, ErrorCategory, ReachableErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!("retrying after: {err}");
//!     } else {
//!         tracing::error!(category = ?err.category(), "fatal: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::source::SourceError;

/// Common trait for all reachable error types
pub trait ReachableErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP client, bind, serve)
    Network,
    /// Endpoint source errors (missing file, bad JSON)
    Source,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Source => "source",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the reachable crate
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),
}

impl ReachableErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Source(e) => e.is_recoverable(),
            Self::Config(_) => false,
            Self::Http(_) => true,
            Self::Server(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Server(_) => ErrorCategory::Network,
            Self::Source(_) => ErrorCategory::Source,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let source_err = Error::Source(SourceError::NotFound("servers.json".into()));
        assert_eq!(source_err.category(), ErrorCategory::Source);

        let server_err = Error::server("address in use");
        assert_eq!(server_err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_is_recoverable() {
        let missing = Error::Source(SourceError::NotFound("servers.json".into()));
        assert!(missing.is_recoverable());

        let config_err = Error::Config(ConfigError::InvalidValue {
            field: "port".to_string(),
            reason: "must be non-zero".to_string(),
        });
        assert!(!config_err.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let source_err = SourceError::NotFound("servers.json".into());
        let unified: Error = source_err.into();
        assert!(matches!(unified, Error::Source(_)));
    }

    #[test]
    fn test_malformed_source_is_not_recoverable() {
        let err: Error = SourceError::Parse {
            path: "servers.json".into(),
            source: serde_json::from_str::<Vec<u8>>("{").unwrap_err(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Source);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_category_as_str() {
        assert_eq!(ErrorCategory::Network.as_str(), "network");
        assert_eq!(ErrorCategory::Config.as_str(), "config");
        assert_eq!(ErrorCategory::Source.as_str(), "source");
    }
}
