//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits so configs can be captured in logs or tests;
//! at runtime the values are sourced from the environment (see `env.rs`).

use serde::{Deserialize, Serialize};

/// Root configuration for the GraphQL gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Deployment environment; "production" switches error shaping.
    pub environment: Environment,

    /// Query-complexity and envelope limits.
    pub limits: LimitsConfig,

    /// Inbound authentication settings.
    pub auth: AuthConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// CORS policy for browser callers.
    pub cors: CorsOrigins,

    /// The single REST upstream proxied by `upstreamGet`.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// True when production error shaping applies.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Query and envelope limits enforced before execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum length of the `query` string in bytes.
    pub max_query_length: usize,

    /// Maximum number of top-level operations per document.
    pub max_operations: usize,

    /// Maximum selection-set depth (leaf fields count as depth+1).
    pub max_query_depth: usize,

    /// Maximum total field count per document.
    pub max_query_fields: usize,

    /// Maximum HTTP request body size in bytes.
    pub request_body_limit: usize,

    /// Overall inbound request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Allow introspection queries.
    pub enable_introspection: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_query_length: 10_000,
            max_operations: 5,
            max_query_depth: 10,
            max_query_fields: 100,
            request_body_limit: 100 * 1024,
            request_timeout_ms: 30_000,
            enable_introspection: false,
        }
    }
}

/// Inbound authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Gateway API key. None disables authentication entirely.
    pub api_key: Option<String>,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Maximum requests per client key per window.
    pub max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max: 120,
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorsOrigins {
    All,
    #[default]
    None,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse the `CORS_ORIGINS` value: `all` | `none` | CSV of origins.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "none" => CorsOrigins::None,
            "all" | "*" => CorsOrigins::All,
            csv => CorsOrigins::List(
                csv.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
            ),
        }
    }
}

/// Upstream REST service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service. None means every call fails with
    /// UPSTREAM_NOT_CONFIGURED.
    pub base_url: Option<String>,

    /// Allowlisted path prefixes. Empty means any safe path is allowed.
    pub allowed_path_prefixes: Vec<String>,

    /// Response size cap in bytes, enforced via Content-Length and again
    /// while streaming the body.
    pub max_response_bytes: u64,

    /// Timeout covering the whole upstream call, in milliseconds.
    pub timeout_ms: u64,

    /// Path probed by the readiness endpoint.
    pub health_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            allowed_path_prefixes: Vec::new(),
            max_response_bytes: 2_000_000,
            timeout_ms: 10_000,
            health_path: "/health".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            environment: Environment::default(),
            limits: LimitsConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsOrigins::default(),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
