use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reachable::config::Config;
use reachable::probe::HttpProber;
use reachable::server::ReachabilityServer;
use reachable::service::ReachabilityService;
use reachable::source;

#[derive(Parser)]
#[command(
    name = "reachable",
    version,
    about = "Probe candidate servers in bounded batches and report the reachable ones",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML config file; environment variables are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one reachability check and print the result as JSON
    Check {
        /// Only keep servers with this priority
        #[arg(short, long, allow_hyphen_values = true)]
        priority: Option<i64>,

        /// Servers probed concurrently; zero or negative probes all at once
        #[arg(short, long, allow_hyphen_values = true)]
        batch_size: Option<i64>,

        /// Per-probe timeout in milliseconds; zero or negative means no timeout
        #[arg(short, long, allow_hyphen_values = true)]
        timeout_ms: Option<i64>,

        /// JSON file with the server list
        #[arg(short, long)]
        servers_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Invalid configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
        config.validate().context("Invalid --log-format")?;
    }

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                batch_size = config.probe.batch_size,
                server_call_timeout_ms = config.probe.server_call_timeout_ms,
                "Starting serve command"
            );
            serve(config).await?;
        }

        Commands::Check {
            priority,
            batch_size,
            timeout_ms,
            servers_file,
        } => {
            if let Some(batch_size) = batch_size {
                config.probe.batch_size = batch_size;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.probe.server_call_timeout_ms = timeout_ms;
            }
            if servers_file.is_some() {
                config.source.servers_file = servers_file;
            }

            tracing::info!(
                priority = ?priority,
                batch_size = config.probe.batch_size,
                server_call_timeout_ms = config.probe.server_call_timeout_ms,
                "Starting check command"
            );
            check(config, priority).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("reachable=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("reachable={level},tower_http={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    if let Err(e) = reachable::metrics::init_metrics() {
        tracing::warn!("Metrics initialization failed: {e}");
    }

    let server = ReachabilityServer::new(config).context("Failed to create server")?;

    println!("{}", server.info().display());
    println!();
    println!("API Endpoints:");
    println!("  GET  /servers[?priority=N]     - Reachable servers sorted by priority");
    println!("  GET  /v1/servers[?priority=N]  - Same, versioned path");
    println!("  GET  /health                   - Health check");
    println!("  GET  /metrics                  - Prometheus metrics endpoint");
    println!();
    println!("Press Ctrl+C to stop.\n");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("Server stopped.");
    Ok(())
}

async fn check(config: Config, priority: Option<i64>) -> Result<()> {
    let prober = HttpProber::new().context("Failed to create HTTP client")?;
    let service = ReachabilityService::new(
        source::from_config(&config.source),
        Arc::new(prober),
        config.probe,
    );

    let report = service
        .check(priority)
        .await
        .context("Reachability check failed")?;

    tracing::info!(
        candidates = report.candidates,
        reachable = report.response.len(),
        batches = report.batches,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Check finished"
    );

    println!("{}", serde_json::to_string_pretty(&report.response)?);
    Ok(())
}
