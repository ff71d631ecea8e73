//! Liveness and readiness endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::graphql::schema::{now_millis, SERVICE_NAME};
use crate::http::server::AppState;

/// `GET /health` and `GET /live`: always 200.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "time": now_millis(),
    }))
}

/// `GET /ready`: 200 only when an upstream is configured and its health
/// path responds. Failure details are generic in production.
pub async fn ready(State(state): State<AppState>) -> Response {
    if !state.client.is_configured() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "ok": false,
                "upstream": {"configured": false},
            })),
        )
            .into_response();
    }

    match state.client.probe_health().await {
        Ok(()) => Json(json!({
            "ok": true,
            "upstream": {"configured": true},
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(code = %e.code(), "Readiness probe failed");
            let message = if state.config.is_production() {
                "upstream health check failed".to_string()
            } else {
                e.to_string()
            };
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "ok": false,
                    "upstream": {"configured": true},
                    "error": {"code": e.code(), "message": message},
                })),
            )
                .into_response()
        }
    }
}
