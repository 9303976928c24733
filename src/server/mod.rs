//! HTTP server for the reachability service
//!
//! ```text
//! GET /servers[?priority=N]     reachable servers, sorted by priority
//! GET /v1/servers[?priority=N]  same, versioned path
//! GET /health                   liveness
//! GET /metrics                  Prometheus text format
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use reachable::config::Config;
//! use reachable::server::ReachabilityServer;
//!
//! let server = ReachabilityServer::new(Config::from_env()?)?;
//! server.start().await?;
//! ```

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::probe::HttpProber;
use crate::service::ReachabilityService;
use crate::source;

pub use api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Availability orchestrator
    pub service: ReachabilityService,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: ReachabilityService) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Reachability Server
// ============================================================================

/// Main HTTP server
pub struct ReachabilityServer {
    config: Config,
    bind_address: SocketAddr,
    state: AppState,
}

impl ReachabilityServer {
    /// Create a server with the HTTP prober and the configured endpoint source
    pub fn new(config: Config) -> Result<Self> {
        let prober = HttpProber::new()?;
        let service = ReachabilityService::new(
            source::from_config(&config.source),
            Arc::new(prober),
            config.probe.clone(),
        );

        Self::with_service(config, service)
    }

    /// Create a server around an existing service
    pub fn with_service(config: Config, service: ReachabilityService) -> Result<Self> {
        config.validate()?;
        let bind_address = config.bind_address()?;

        Ok(Self {
            config,
            bind_address,
            state: AppState::new(service),
        })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        // Add CORS layer if enabled
        if self.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        // Add tracing layer if enabled
        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.bind_address;

        tracing::info!("Starting reachability server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::server(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| Error::server(e.to_string()))?;

        tracing::info!("Reachability server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.bind_address,
            batch_size: self.config.probe.batch_size,
            server_call_timeout_ms: self.config.probe.server_call_timeout_ms,
            cors_enabled: self.config.server.enable_cors,
            request_logging_enabled: self.config.server.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub batch_size: i64,
    pub server_call_timeout_ms: i64,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        let batching = if self.batch_size > 0 {
            self.batch_size.to_string()
        } else {
            format!("{} (disabled, single batch)", self.batch_size)
        };
        let timeout = if self.server_call_timeout_ms > 0 {
            format!("{}ms", self.server_call_timeout_ms)
        } else {
            "none".to_string()
        };

        format!(
            "Reachability Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Batch Size: {}\n\
             Server Call Timeout: {}\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            batching,
            timeout,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
