//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (parsing handles syntactic)
//! - Validate value ranges (limits > 0, windows sane)
//! - Check the upstream URL and path prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully-parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive = [
        ("limits.max_query_length", config.limits.max_query_length),
        ("limits.max_operations", config.limits.max_operations),
        ("limits.max_query_depth", config.limits.max_query_depth),
        ("limits.max_query_fields", config.limits.max_query_fields),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError {
                field,
                message: "must be greater than zero".to_string(),
            });
        }
    }

    if config.limits.request_body_limit < 1024 {
        errors.push(ValidationError {
            field: "limits.request_body_limit",
            message: "must be at least 1024 bytes".to_string(),
        });
    }

    if config.rate_limit.window_ms < 1000 {
        errors.push(ValidationError {
            field: "rate_limit.window_ms",
            message: "must be at least 1000ms".to_string(),
        });
    }
    if config.rate_limit.max == 0 {
        errors.push(ValidationError {
            field: "rate_limit.max",
            message: "must be greater than zero".to_string(),
        });
    }

    if let Some(base_url) = &config.upstream.base_url {
        match Url::parse(base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError {
                field: "upstream.base_url",
                message: format!("unsupported scheme {:?}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "upstream.base_url",
                message: e.to_string(),
            }),
        }
    }

    for prefix in &config.upstream.allowed_path_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError {
                field: "upstream.allowed_path_prefixes",
                message: format!("prefix {prefix:?} must start with '/'"),
            });
        }
    }

    if config.upstream.max_response_bytes == 0 {
        errors.push(ValidationError {
            field: "upstream.max_response_bytes",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError {
            field: "upstream.timeout_ms",
            message: "must be greater than zero".to_string(),
        });
    }
    if !config.upstream.health_path.starts_with('/') {
        errors.push(ValidationError {
            field: "upstream.health_path",
            message: "must start with '/'".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
