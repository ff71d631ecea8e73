//! The `/graphql` handler.
//!
//! # Responsibilities
//! - Run the request guard before the engine sees anything
//! - Hand the validated envelope to the schema with per-request context
//! - Shape execution errors for the configured environment

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::ForwardedHeaders;
use crate::error::GuardError;
use crate::graphql::format;
use crate::guard;
use crate::http::request_id::REQUEST_ID_HEADER;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Handle every method on `/graphql`; the guard shapes non-POST rejections.
pub async fn graphql_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // 1. Envelope guard, cheapest checks first.
    if let Err(e) = guard::check_method(&parts.method) {
        return guard_response(e, &request_id);
    }
    if let Err(e) = guard::check_content_type(&parts.headers) {
        return guard_response(e, &request_id);
    }
    let bytes = match axum::body::to_bytes(body, state.config.limits.request_body_limit).await {
        Ok(bytes) => bytes,
        Err(_) => return guard_response(GuardError::BodyTooLarge, &request_id),
    };
    let envelope = match guard::parse_envelope(&bytes, state.config.limits.max_query_length) {
        Ok(envelope) => envelope,
        Err(e) => return guard_response(e, &request_id),
    };

    // 2. Execute through the engine; complexity rules run during validation.
    let forwarded = parts
        .extensions
        .get::<ForwardedHeaders>()
        .cloned()
        .unwrap_or_default();

    let mut gql_request = async_graphql::Request::new(envelope.query);
    if let Some(variables) = envelope.variables {
        gql_request =
            gql_request.variables(async_graphql::Variables::from_json(Value::Object(variables)));
    }
    if let Some(operation_name) = envelope.operation_name {
        gql_request = gql_request.operation_name(operation_name);
    }
    gql_request = gql_request.data(forwarded);

    let mut response = state.schema.execute(gql_request).await;

    // 3. Shape errors for the wire.
    format::shape_errors(&mut response.errors, state.config.is_production());

    if !response.errors.is_empty() {
        tracing::debug!(
            request_id = %request_id,
            errors = response.errors.len(),
            "GraphQL request completed with errors"
        );
    }
    metrics::record_graphql_request(200, start);

    Json(response).into_response()
}

fn guard_response(error: GuardError, request_id: &str) -> Response {
    tracing::warn!(request_id = %request_id, code = %error.code(), "Request rejected by guard");
    metrics::record_guard_rejection(error.code());

    let mut extensions = json!({"code": error.code()});
    if let GuardError::QueryTooLarge { length, max } = &error {
        extensions["queryLength"] = json!(length);
        extensions["maxQueryLength"] = json!(max);
    }

    (
        error.status(),
        Json(json!({
            "errors": [{
                "message": error.to_string(),
                "extensions": extensions,
            }]
        })),
    )
        .into_response()
}
