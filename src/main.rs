//! GET-only forwarding HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                       PROXY                          │
//!   Client        │  ┌──────────┐   ┌──────────┐   ┌───────────────┐     │
//!   ──────────────┼─▶│   net    │──▶│ request  │──▶│    headers    │     │
//!                 │  │ listener │   │ + target │   │ HTTP/1.0 block│     │
//!                 │  └──────────┘   └──────────┘   └───────┬───────┘     │
//!                 │                                        ▼             │
//!   Client        │                               ┌───────────────┐      │   Origin
//!   ◀─────────────┼───────────── raw relay ◀──────│    forward    │◀─────┼── Server
//!                 │                               └───────────────┘      │
//!                 │  config · observability · resilience · lifecycle     │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use get_proxy::lifecycle::{resolve_config, shutdown_signal, Shutdown};
use get_proxy::net::Listener;
use get_proxy::observability::{logging, metrics};
use get_proxy::ProxyServer;

#[derive(Parser)]
#[command(name = "get-proxy")]
#[command(about = "Forwarding proxy for plain HTTP GET requests", long_about = None)]
struct Cli {
    /// TCP port to listen on
    port: u16,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind instead of the configured host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.port, cli.host.as_deref())
        .inspect_err(|e| eprintln!("get-proxy: invalid configuration: {}", e))?;

    logging::init_logging(&config.observability);

    tracing::info!("get-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_connections = config.listener.max_connections,
        connect_timeout_secs = config.timeouts.connect_secs,
        idle_timeout_secs = config.timeouts.idle_secs,
        error_responses = config.relay.error_responses,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = Listener::bind(&config.listener)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Cannot open listening endpoint"))?;

    let shutdown = Shutdown::new();
    let server = ProxyServer::new(config);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();
    server_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
