//! Reachability probing
//!
//! - [`Prober`] - single-endpoint check, one attempt, bounded by a timeout
//! - [`HttpProber`] - the reqwest-backed implementation used in production
//! - [`check_batch`] - concurrent fan-out over one batch of servers
//!
//! A probe never fails. Every transport error, timeout or non-2xx status
//! becomes `false`, so one bad endpoint cannot abort a batch.

pub mod batch;
pub mod http;

use async_trait::async_trait;
use std::time::Duration;

use crate::models::Server;

pub use batch::check_batch;
pub use http::HttpProber;

/// Single reachability check against one URL
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `url` once and report whether it is online
    ///
    /// `timeout` of `None` means the probe waits for as long as the transport does.
    async fn is_online(&self, url: &str, timeout: Option<Duration>) -> bool;
}

/// Online means a status code in `[200, 300)`
///
/// Informational, redirect, client and server error codes are all offline.
#[inline]
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Result of probing one server inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome<'a> {
    pub server: &'a Server,
    pub online: bool,
}
