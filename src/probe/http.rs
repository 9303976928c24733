//! HTTP prober built on reqwest

use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;

use super::{is_success_status, Prober};
use crate::metrics;

/// Probes servers with a single `GET`
///
/// Redirects are not followed: a 3xx answer is what the server said, and it
/// is not a 2xx. The response body is never read.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// Create a prober with its own connection pool
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialised
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(format!("reachable/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    ///
    /// The client's redirect policy is used as is.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn is_online(&self, url: &str, timeout: Option<Duration>) -> bool {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let online = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let online = is_success_status(status);
                if !online {
                    tracing::debug!(url = %url, status, "Server responded with non-success status");
                }
                online
            }
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    error = %e,
                    "Error checking server availability"
                );
                false
            }
        };

        metrics::record_probe(online);
        online
    }
}
