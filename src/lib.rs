//! reachable - find out which candidate servers are up
//!
//! Given a list of candidate servers with priority tiers, the service probes
//! them in bounded batches and returns the reachable ones, ordered by priority.
//!
//! # Architecture
//!
//! - [`source`] - where the candidate list comes from (embedded, JSON file, static)
//! - [`probe`] - single-server HTTP probe and the concurrent batch executor
//! - [`service`] - the orchestrator: filter, partition, probe batch by batch, sort
//! - [`server`] - axum HTTP API (`GET /servers`, `/health`, `/metrics`)
//! - [`config`] - configuration from environment variables or TOML
//! - [`metrics`] - Prometheus counters and histograms
//! - [`models`] - `Server` and the response body
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reachable::config::ProbeConfig;
//! use reachable::probe::HttpProber;
//! use reachable::service::ReachabilityService;
//! use reachable::source::EmbeddedSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = ReachabilityService::new(
//!         Arc::new(EmbeddedSource),
//!         Arc::new(HttpProber::new()?),
//!         ProbeConfig::default(),
//!     );
//!     let response = service.get_reachable_servers(Some(4)).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod probe;
pub mod server;
pub mod service;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ProbeConfig};
    pub use crate::error::{Error, ErrorCategory, ReachableErrorTrait, Result};
    pub use crate::models::{GetServersResponse, Server};
    pub use crate::probe::{HttpProber, Prober};
    pub use crate::service::ReachabilityService;
    pub use crate::source::EndpointSource;
}

// Direct re-exports for convenience
pub use models::{GetServersResponse, Server};
