//! Standalone host for the no-redirect relay.
//!
//! ```text
//!     Client ──▶ host (axum) ──▶ RelayHandler ──▶ reqwest (redirects off) ──▶ Backend
//!            ◀── status, headers, body mirrored verbatim (3xx included) ◀──
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use no_redirect::config::{load_config, HostConfig};
use no_redirect::http::HttpServer;
use no_redirect::lifecycle::Shutdown;
use no_redirect::observability::{logging, metrics};
use no_redirect::plugin::{HandlerRegistry, Registerer, TracingLogger};

#[derive(Parser)]
#[command(name = "no-redirect")]
#[command(about = "Relay requests to a backend without following redirects", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("no-redirect v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Registration handshake
    let mut registerer = Registerer::new();
    registerer.register_logger(Arc::new(TracingLogger));

    let mut registry = HandlerRegistry::new();
    registerer.register_clients(&mut registry);

    let plugin_name = config.plugin.name().unwrap_or_default().to_string();
    let relay = registry.build(&plugin_name, config.plugin.extra())?;
    tracing::info!(plugin = %plugin_name, "Plugin registered");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.trigger_on_signal().await });

    let server = HttpServer::new(config, relay)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
