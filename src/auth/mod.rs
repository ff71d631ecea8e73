//! Inbound authentication and header forwarding.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → api key check (x-api-key or Authorization: ApiKey, constant-time)
//!     → 401 on mismatch/absence
//!     → ForwardedHeaders built from the allowlist (gateway ApiKey stripped)
//!     → inserted as a request extension for the resolver
//! ```
//!
//! # Design Decisions
//! - No configured key means every request passes
//! - Key comparison uses `subtle`; length mismatch fails through the same
//!   padded comparison, it never short-circuits
//! - The gateway's own credential is never forwarded upstream; an end
//!   user's `Authorization: Bearer` passes through byte-for-byte

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::config::GatewayConfig;
use crate::http::server::AppState;

/// Header names copied from the inbound request to the upstream call.
const FORWARDED_HEADERS: [&str; 7] = [
    "authorization",
    "x-request-id",
    "x-correlation-id",
    "accept-language",
    "x-tenant-id",
    "x-user-id",
    "x-company-id",
];

/// The subset of inbound headers that may travel upstream.
#[derive(Clone, Debug, Default)]
pub struct ForwardedHeaders(HeaderMap);

impl ForwardedHeaders {
    /// Copy the allowlisted headers, dropping the gateway's own
    /// `Authorization: ApiKey ...` credential.
    pub fn from_request_headers(headers: &HeaderMap) -> Self {
        let mut forwarded = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = headers.get(name) {
                if name == "authorization" && is_api_key_scheme(value.as_bytes()) {
                    continue;
                }
                if let Ok(name) = header::HeaderName::from_bytes(name.as_bytes()) {
                    forwarded.insert(name, value.clone());
                }
            }
        }
        Self(forwarded)
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }
}

fn is_api_key_scheme(value: &[u8]) -> bool {
    value.len() >= 7 && value[..7].eq_ignore_ascii_case(b"apikey ")
}

/// Constant-time equality over byte strings.
///
/// Both inputs are padded to the longer length with different fill bytes,
/// so unequal lengths fail without making the comparison time depend on
/// where the first mismatch sits.
pub fn constant_time_compare(provided: &[u8], expected: &[u8]) -> bool {
    let max_len = provided.len().max(expected.len());
    let mut a = vec![0u8; max_len];
    let mut b = vec![0xFFu8; max_len];
    a[..provided.len()].copy_from_slice(provided);
    b[..expected.len()].copy_from_slice(expected);

    let lengths_equal = provided.len().ct_eq(&expected.len());
    let contents_equal = a.ct_eq(&b);
    (lengths_equal & contents_equal).into()
}

/// Extract the caller-presented key: `x-api-key` or `Authorization: ApiKey`.
fn presented_key(headers: &HeaderMap) -> Option<&[u8]> {
    if let Some(value) = headers.get("x-api-key") {
        return Some(value.as_bytes());
    }
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let bytes = value.as_bytes();
        if is_api_key_scheme(bytes) {
            return Some(&bytes[7..]);
        }
    }
    None
}

/// True when the request may proceed under the given config.
pub fn check_api_key(headers: &HeaderMap, config: &GatewayConfig) -> bool {
    let Some(expected) = &config.auth.api_key else {
        return true;
    };
    match presented_key(headers) {
        Some(provided) => constant_time_compare(provided, expected.as_bytes()),
        None => false,
    }
}

/// Axum middleware guarding the GraphQL endpoint.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !check_api_key(request.headers(), &state.config) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        crate::observability::metrics::record_auth_rejection();
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "code": "UNAUTHORIZED",
                    "message": "Missing or invalid API key",
                }
            })),
        )
            .into_response();
    }

    let forwarded = ForwardedHeaders::from_request_headers(request.headers());
    request.extensions_mut().insert(forwarded);
    next.run(request).await
}
