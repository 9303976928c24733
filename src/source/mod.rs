//! Endpoint sources
//!
//! A source hands the orchestrator the full candidate list on every call. It
//! never filters; priority filtering happens in the service.
//!
//! Three sources are provided:
//!
//! - [`EmbeddedSource`] - the list compiled into the binary from `data/servers.json`
//! - [`JsonFileSource`] - a JSON file re-read on every call
//! - [`StaticSource`] - an in-memory list, mostly for tests and the CLI

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::SourceConfig;
use crate::models::Server;

const EMBEDDED_SERVERS: &str = include_str!("../../data/servers.json");

/// Errors raised while reading the server list
#[derive(Error, Debug)]
pub enum SourceError {
    /// Server list file does not exist
    #[error("Server list not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Server list file could not be read
    #[error("Failed to read server list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Server list is not a JSON array of `{ url, priority }`
    #[error("Invalid server list {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// A missing or unreadable file may appear later; a malformed one will not fix itself
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Io { .. })
    }
}

/// Supplier of candidate servers
///
/// Reads are synchronous and return the complete list, in source order.
pub trait EndpointSource: Send + Sync {
    fn servers(&self) -> Result<Vec<Server>, SourceError>;
}

fn parse_servers(raw: &str, path: &Path) -> Result<Vec<Server>, SourceError> {
    serde_json::from_str(raw).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Fixed in-memory server list
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    servers: Vec<Server>,
}

impl StaticSource {
    pub fn new(servers: Vec<Server>) -> Self {
        Self { servers }
    }
}

impl EndpointSource for StaticSource {
    fn servers(&self) -> Result<Vec<Server>, SourceError> {
        Ok(self.servers.clone())
    }
}

impl FromIterator<Server> for StaticSource {
    fn from_iter<I: IntoIterator<Item = Server>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Server list compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EndpointSource for EmbeddedSource {
    fn servers(&self) -> Result<Vec<Server>, SourceError> {
        parse_servers(EMBEDDED_SERVERS, Path::new("<embedded servers.json>"))
    }
}

/// JSON file holding `[{ "url": ..., "priority": ... }]`
///
/// The file is read on every call so edits take effect without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EndpointSource for JsonFileSource {
    fn servers(&self) -> Result<Vec<Server>, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SourceError::NotFound(self.path.clone())
            } else {
                SourceError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        parse_servers(&raw, &self.path)
    }
}

/// Build the source selected by configuration
pub fn from_config(config: &SourceConfig) -> Arc<dyn EndpointSource> {
    match &config.servers_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using server list file");
            Arc::new(JsonFileSource::new(path))
        }
        None => {
            tracing::info!("Using embedded server list");
            Arc::new(EmbeddedSource)
        }
    }
}
