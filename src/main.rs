//! GraphQL Read Gateway
//!
//! A hardened GraphQL front door for a single REST upstream, built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                GRAPHQL GATEWAY                  │
//!                    │                                                 │
//!   Client Request   │  ┌──────────┐   ┌───────┐   ┌───────────────┐  │
//!   ─────────────────┼─▶│rate limit│──▶│ auth  │──▶│ request guard │  │
//!                    │  └──────────┘   │ gate  │   └───────┬───────┘  │
//!                    │                 └───────┘           │          │
//!                    │                                     ▼          │
//!                    │                 ┌──────────────────────────┐   │
//!                    │                 │  GraphQL engine          │   │
//!                    │                 │  (depth/field/operation  │   │
//!                    │                 │   rules, then resolvers) │   │
//!                    │                 └────────────┬─────────────┘   │
//!                    │                              │                 │
//!                    │                              ▼                 │
//!   Client Response  │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   ◀────────────────┼──│  error   │◀──│sanitizer │◀──│ upstream  │◀─┼── REST
//!                    │  │formatter │   └──────────┘   │  client   │  │   Upstream
//!                    │  └──────────┘                  └───────────┘  │
//!                    └────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod auth;
pub mod config;
pub mod error;
pub mod graphql;
pub mod guard;
pub mod http;
pub mod sanitize;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::env::load_config;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphql_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("graphql-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    // Resolve configuration once; it is immutable from here on.
    let config = load_config()?;

    tracing::info!(
        bind_address = %config.bind_address,
        environment = ?config.environment,
        upstream_configured = config.upstream.base_url.is_some(),
        max_query_depth = config.limits.max_query_depth,
        max_query_fields = config.limits.max_query_fields,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    // Metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Ctrl-C triggers graceful shutdown.
    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
