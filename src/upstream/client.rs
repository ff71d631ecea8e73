//! Single bounded, cancellable GET against the configured upstream.
//!
//! # Responsibilities
//! - Enforce path safety before any connection is made
//! - Bound the whole call (connect + headers + body) with one timeout
//! - Cap the response size via Content-Length and again while streaming
//! - Classify every failure with a stable error code
//!
//! # Design Decisions
//! - The timeout wraps the entire fetch future; expiry drops the in-flight
//!   body, which aborts the underlying connection
//! - The body is read frame by frame with a running byte counter, so an
//!   oversized body is never fully buffered even when Content-Length lies
//! - Redirects are rejected, not followed

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Uri};
use http_body_util::BodyExt;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::upstream::path::check_path;

/// Parsed upstream response body.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// The upstream declared a JSON content type and the body parsed.
    Json(Value),
    /// Any other content type, decoded as text (lossy UTF-8).
    Text(String),
}

impl UpstreamBody {
    /// Collapse into a JSON value; text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            UpstreamBody::Json(value) => value,
            UpstreamBody::Text(text) => Value::String(text),
        }
    }
}

/// HTTP client for the single configured REST upstream.
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.base_url.is_some()
    }

    /// Resolver entry point: validate the path (including the configured
    /// prefix allowlist) and perform the bounded GET.
    pub async fn get(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<UpstreamBody, UpstreamError> {
        check_path(path, &self.config.allowed_path_prefixes)?;
        self.fetch(path, headers).await
    }

    /// Readiness probe against the configured health path. Skips the prefix
    /// allowlist: the probe target comes from config, not from a caller.
    pub async fn probe_health(&self) -> Result<(), UpstreamError> {
        let path = self.config.health_path.clone();
        self.fetch(&path, &HeaderMap::new()).await.map(|_| ())
    }

    async fn fetch(&self, path: &str, headers: &HeaderMap) -> Result<UpstreamBody, UpstreamError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured)?;

        let uri: Uri = format!("{base_url}{path}")
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| UpstreamError::Fetch(e.to_string()))?;

        let timeout_ms = self.config.timeout_ms;
        match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.fetch_inner(uri, headers),
        )
        .await
        {
            Ok(result) => result,
            // Expiry drops fetch_inner along with any in-flight body read,
            // releasing the connection.
            Err(_) => Err(UpstreamError::Timeout { timeout_ms }),
        }
    }

    async fn fetch_inner(
        &self,
        uri: Uri,
        headers: &HeaderMap,
    ) -> Result<UpstreamBody, UpstreamError> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(request_headers) = builder.headers_mut() {
            for (name, value) in headers {
                request_headers.insert(name.clone(), value.clone());
            }
        }
        let request = builder
            .body(Body::empty())
            .map_err(|e| UpstreamError::Fetch(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| UpstreamError::Fetch(e.to_string()))?;

        let status = response.status();
        if status.is_redirection() {
            return Err(UpstreamError::RedirectNotAllowed {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let max_bytes = self.config.max_response_bytes;
        if let Some(declared) = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            if declared > max_bytes {
                return Err(UpstreamError::TooLarge { max_bytes });
            }
        }

        let json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let mut body = response.into_body();
        let mut collected: Vec<u8> = Vec::new();
        let mut total: u64 = 0;
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|e| UpstreamError::Fetch(e.to_string()))?;
            if let Some(data) = frame.data_ref() {
                total += data.len() as u64;
                if total > max_bytes {
                    // Dropping the body here cancels the read and aborts
                    // the connection; nothing more is buffered.
                    return Err(UpstreamError::TooLarge { max_bytes });
                }
                collected.extend_from_slice(data);
            }
        }

        if json {
            serde_json::from_slice(&collected)
                .map(UpstreamBody::Json)
                .map_err(|_| UpstreamError::InvalidJson)
        } else {
            Ok(UpstreamBody::Text(
                String::from_utf8_lossy(&collected).into_owned(),
            ))
        }
    }
}

/// True for `application/json` and structured-syntax `+json` types.
fn is_json_content_type(value: &str) -> bool {
    let media = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media == "application/json" || media.ends_with("+json")
}
