//! Configuration loading from the process environment.

use std::env;

use crate::config::schema::{CorsOrigins, Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Parse { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse { name, value } => {
                write!(f, "Cannot parse {name}={value:?}")
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Build and validate a [`GatewayConfig`] from environment variables.
///
/// Every variable is optional; defaults come from the schema. This is the
/// only place in the crate that reads the environment.
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();

    if let Some(addr) = non_empty("BIND_ADDRESS") {
        config.bind_address = addr;
    }
    if let Some(env_name) = non_empty("GATEWAY_ENV") {
        config.environment = match env_name.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };
    }

    parse_into("MAX_QUERY_LENGTH", &mut config.limits.max_query_length)?;
    parse_into("MAX_OPERATIONS", &mut config.limits.max_operations)?;
    parse_into("MAX_QUERY_DEPTH", &mut config.limits.max_query_depth)?;
    parse_into("MAX_QUERY_FIELDS", &mut config.limits.max_query_fields)?;
    parse_into("REQUEST_BODY_LIMIT", &mut config.limits.request_body_limit)?;
    parse_into("REQUEST_TIMEOUT_MS", &mut config.limits.request_timeout_ms)?;
    parse_into("ENABLE_INTROSPECTION", &mut config.limits.enable_introspection)?;

    config.auth.api_key = non_empty("API_KEY");

    parse_into("RATE_LIMIT_WINDOW_MS", &mut config.rate_limit.window_ms)?;
    parse_into("RATE_LIMIT_MAX", &mut config.rate_limit.max)?;

    if let Some(origins) = non_empty("CORS_ORIGINS") {
        config.cors = CorsOrigins::parse(&origins);
    }

    config.upstream.base_url = non_empty("UPSTREAM_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string());
    if let Some(prefixes) = non_empty("UPSTREAM_ALLOWED_PATH_PREFIXES") {
        config.upstream.allowed_path_prefixes = prefixes
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    parse_into("UPSTREAM_MAX_RESPONSE_BYTES", &mut config.upstream.max_response_bytes)?;
    parse_into("UPSTREAM_TIMEOUT_MS", &mut config.upstream.timeout_ms)?;
    if let Some(path) = non_empty("UPSTREAM_HEALTH_PATH") {
        config.upstream.health_path = path;
    }

    if let Some(level) = non_empty("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    parse_into("METRICS_ENABLED", &mut config.observability.metrics_enabled)?;
    if let Some(addr) = non_empty("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_into<T: std::str::FromStr>(
    name: &'static str,
    slot: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = non_empty(name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { name, value: raw })?;
    }
    Ok(())
}
