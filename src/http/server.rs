//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, limits, auth, rate limit)
//! - Bind the server to a listener and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth;
use crate::config::{CorsOrigins, GatewayConfig};
use crate::graphql::{build_schema, GatewaySchema};
use crate::http::graphql::graphql_handler;
use crate::http::health;
use crate::http::request_id::request_id_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub schema: GatewaySchema,
    pub client: Arc<UpstreamClient>,
}

/// HTTP server for the GraphQL gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);
        let client = Arc::new(UpstreamClient::new(config.upstream.clone()));
        let schema = build_schema(&config, client.clone());
        let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));

        let state = AppState {
            config: config.clone(),
            schema,
            client,
        };

        let router = Self::build_router(&config, state, limiter);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        limiter: Arc<RateLimiterState>,
    ) -> Router {
        // Auth runs inside rate limiting: a client burning its budget on bad
        // keys still gets 429s.
        let graphql = Router::new()
            .route("/graphql", any(graphql_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_api_key,
            ))
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));

        Router::new()
            .route("/health", get(health::health))
            .route("/live", get(health::health))
            .route("/ready", get(health::ready))
            .merge(graphql)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_millis(
                config.limits.request_timeout_ms,
            )))
            .layer(DefaultBodyLimit::max(config.limits.request_body_limit))
            .layer(cors_layer(&config.cors))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections until the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        // No allowed origins configured: emit no CORS headers at all.
        CorsOrigins::None => CorsLayer::new(),
        CorsOrigins::All => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> =
                list.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}
