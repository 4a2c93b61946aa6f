//! Frontend proxy server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ tenancy ──▶ http::request
//!                                                      │
//!                                                      ▼
//!                                                 forwarder ──▶ resilience ──▶ upstream ──▶ API Gateway
//!                                                      │
//!     Client Response                                  ▼
//!     ◀────────────── http::response ◀──────── ForwardResult
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use frontend_proxy::lifecycle::{signals, startup, Shutdown};
use frontend_proxy::observability::logging;
use frontend_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "frontend-proxy")]
#[command(about = "Multi-tenant frontend proxy for the API Gateway", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = startup::load(cli.config.as_deref())?;
    logging::init_logging(&loaded.config.observability);
    startup::report_ignored(&loaded);
    let config = loaded.config;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.runtime.environment,
        bind_address = %config.listener.bind_address,
        tenants = config.tenants.len(),
        "frontend-proxy starting"
    );

    let forwarder = startup::build_forwarder(&config)?;
    startup::start_metrics(&config);

    let grace = Duration::from_secs(config.listener.shutdown_grace_secs);
    let listener = startup::bind(&config).await?;
    let server = HttpServer::new(config, forwarder);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));
    tokio::spawn(async move { shutdown.enforce_deadline(grace).await });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
