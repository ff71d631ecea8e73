//! Fixed-window rate limiting middleware.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;

use crate::config::schema::RateLimitConfig;
use crate::observability::metrics;

/// Counter for one client within the current window.
struct Window {
    started: Instant,
    count: u32,
}

/// Shared fixed-window limiter state.
///
/// Entries are updated under the DashMap entry lock, so concurrent requests
/// within the same window count atomically.
pub struct RateLimiterState {
    windows: DashMap<String, Window>,
    window: Duration,
    max: u32,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            window: Duration::from_millis(config.window_ms),
            max: config.max,
        }
    }

    /// Count one request for `key`. Returns how long the client must wait
    /// when the window is exhausted.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window { started: now, count: 0 });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < self.max {
            entry.count += 1;
            Ok(())
        } else {
            let retry_after = self.window.saturating_sub(now.duration_since(entry.started));
            Err(retry_after)
        }
    }

    /// Drop windows idle long enough to be irrelevant. Called opportunistically.
    fn evict_stale(&self) {
        let cutoff = self.window * 2;
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < cutoff);
    }
}

/// Pick the rate-limit key for a request: a fingerprint of the presented
/// API key when there is one, otherwise the client IP (first hop of
/// `x-forwarded-for` when present).
fn client_key(headers: &HeaderMap, addr: &SocketAddr) -> String {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return format!("key:{}", fingerprint(key));
    }
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return format!("ip:{}", forwarded.trim());
    }
    format!("ip:{}", addr.ip())
}

/// Short non-reversible tag for grouping requests by key without storing it.
fn fingerprint(key: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Middleware enforcing the configured per-client request budget.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(request.headers(), &addr);

    match state.check(&key) {
        Ok(()) => {
            if state.windows.len() > 10_000 {
                state.evict_stale();
            }
            next.run(request).await
        }
        Err(retry_after) => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            metrics::record_rate_limited();
            let retry_after_ms = retry_after.as_millis() as u64;
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": "Too many requests",
                        "retryAfterMs": retry_after_ms,
                    }
                })),
            )
                .into_response();
            let seconds = retry_after.as_secs().max(1);
            if let Ok(value) = header::HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}
