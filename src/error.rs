//! Domain error types with stable wire codes.
//!
//! Every failure a caller can observe carries a `code()` string that is
//! part of the public contract; messages may change, codes do not.

use async_graphql::ErrorExtensions;
use axum::http::StatusCode;
use thiserror::Error;

/// Structural rejection of the inbound request, before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Only POST is accepted on /graphql")]
    MethodNotAllowed,

    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Request body exceeds the configured size limit")]
    BodyTooLarge,

    #[error("Request body is not valid JSON")]
    InvalidJson,

    #[error("Batched (array) requests are not supported")]
    BatchingNotSupported,

    #[error("Request body must be a JSON object")]
    InvalidRequestBody,

    #[error("The query field must be a non-null string")]
    InvalidQuery,

    #[error("Query length {length} exceeds the maximum of {max}")]
    QueryTooLarge { length: usize, max: usize },

    #[error("variables must be an object or null")]
    InvalidVariables,

    #[error("operationName must be a string or null")]
    InvalidOperationName,
}

impl GuardError {
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            GuardError::UnsupportedContentType => "UNSUPPORTED_CONTENT_TYPE",
            GuardError::BodyTooLarge => "BODY_TOO_LARGE",
            GuardError::InvalidJson => "INVALID_JSON",
            GuardError::BatchingNotSupported => "BATCHING_NOT_SUPPORTED",
            GuardError::InvalidRequestBody => "INVALID_REQUEST_BODY",
            GuardError::InvalidQuery => "INVALID_QUERY",
            GuardError::QueryTooLarge { .. } => "QUERY_TOO_LARGE",
            GuardError::InvalidVariables => "INVALID_VARIABLES",
            GuardError::InvalidOperationName => "INVALID_OPERATION_NAME",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GuardError::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GuardError::BodyTooLarge | GuardError::QueryTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Rejection of an upstream path before any connection is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path is malformed or contains traversal sequences")]
    Invalid,

    #[error("Path is outside the allowed prefixes")]
    NotAllowed,
}

impl PathError {
    pub fn code(&self) -> &'static str {
        match self {
            PathError::Invalid => "INVALID_PATH",
            PathError::NotAllowed => "PATH_NOT_ALLOWED",
        }
    }
}

/// Failure of the bounded upstream GET.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("No upstream base URL is configured")]
    NotConfigured,

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Upstream call exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Upstream response exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    #[error("Upstream responded with redirect status {status}")]
    RedirectNotAllowed { status: u16 },

    #[error("Upstream responded with status {status}")]
    Status { status: u16 },

    #[error("Upstream declared JSON but the body did not parse")]
    InvalidJson,

    #[error("Upstream request failed: {0}")]
    Fetch(String),
}

impl UpstreamError {
    pub fn code(&self) -> &'static str {
        match self {
            UpstreamError::NotConfigured => "UPSTREAM_NOT_CONFIGURED",
            UpstreamError::Path(e) => e.code(),
            UpstreamError::Timeout { .. } => "UPSTREAM_TIMEOUT",
            UpstreamError::TooLarge { .. } => "UPSTREAM_RESPONSE_TOO_LARGE",
            UpstreamError::RedirectNotAllowed { .. } => "UPSTREAM_REDIRECT_NOT_ALLOWED",
            UpstreamError::Status { .. } => "UPSTREAM_ERROR",
            UpstreamError::InvalidJson => "UPSTREAM_INVALID_JSON",
            UpstreamError::Fetch(_) => "UPSTREAM_FETCH_FAILED",
        }
    }
}

impl ErrorExtensions for UpstreamError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code());
            match self {
                UpstreamError::Timeout { timeout_ms } => ext.set("timeoutMs", *timeout_ms),
                UpstreamError::TooLarge { max_bytes } => ext.set("maxResponseBytes", *max_bytes),
                UpstreamError::RedirectNotAllowed { status }
                | UpstreamError::Status { status } => ext.set("status", *status as u64),
                _ => {}
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_codes_and_statuses() {
        assert_eq!(GuardError::MethodNotAllowed.code(), "METHOD_NOT_ALLOWED");
        assert_eq!(
            GuardError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GuardError::UnsupportedContentType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            GuardError::QueryTooLarge { length: 11, max: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(GuardError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GuardError::BatchingNotSupported.code(),
            "BATCHING_NOT_SUPPORTED"
        );
    }

    #[test]
    fn path_errors_convert_into_upstream_errors() {
        let err: UpstreamError = PathError::Invalid.into();
        assert_eq!(err.code(), "INVALID_PATH");
        let err: UpstreamError = PathError::NotAllowed.into();
        assert_eq!(err.code(), "PATH_NOT_ALLOWED");
    }

    #[test]
    fn upstream_extensions_carry_the_classification() {
        let err = UpstreamError::Timeout { timeout_ms: 250 }.extend();
        let ext = err.extensions.as_ref().unwrap();
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::from("UPSTREAM_TIMEOUT"))
        );
        assert_eq!(ext.get("timeoutMs"), Some(&async_graphql::Value::from(250u64)));

        let err = UpstreamError::Status { status: 502 }.extend();
        let ext = err.extensions.as_ref().unwrap();
        assert_eq!(ext.get("status"), Some(&async_graphql::Value::from(502u64)));
    }
}
