//! Hostname-routed cluster ingress gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::Listener ──▶ http::server ──┬──▶ /health, /healthz, /routes
//!                                                 │
//!                                                 └──▶ routing::Dispatcher
//!                                                        │ decoder   (Host → Route)
//!                                                        │ resolver  (Route → BackendTarget)
//!                                                        │ forwarder (stream to target)
//!                                                        ▼
//!     Client ◀── response + X-Proxy-* ◀────────────── backend service
//!
//!     Background: health::HealthProbe (cache re-checks), metrics exporter
//! ```

use std::path::PathBuf;

use clap::Parser;

use ingress_router::config;
use ingress_router::http::HttpServer;
use ingress_router::lifecycle::{build_resolver, wait_for_signal, Shutdown};
use ingress_router::net::{install_crypto_provider, Listener};
use ingress_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "ingress-router")]
#[command(about = "Routes requests to cluster services by hostname", long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the stand-in resolver regardless of configuration
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_from_env();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ingress-router starting");

    let mut config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    if args.dev {
        config.discovery.dev_mode = true;
    }

    tracing::info!(
        port = config.listener.port,
        base_domain = %config.routing.base_domain,
        default_env = %config.routing.default_env,
        allowed_namespaces = ?config.routing.allowed_namespaces,
        dev_mode = config.discovery.dev_mode,
        cache = config.cache.enabled,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        // Validation guarantees this parses.
        if let Ok(addr) = addr.parse() {
            metrics::init_metrics(addr);
        }
    }

    install_crypto_provider();
    let resolver = match build_resolver(&config).await {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise service resolver");
            return Err(e.into());
        }
    };

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, resolver);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        signal = wait_for_signal() => {
            tracing::info!(signal, "Shutdown signal received");
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => {
            result??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
