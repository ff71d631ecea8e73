//! Structural request validation.
//!
//! # Responsibilities
//! - Reject anything that is not a well-formed single GraphQL envelope
//!   before any parsing or execution happens
//! - Enforce the query length cap
//!
//! # Design Decisions
//! - Guard failures are terminal; no resolver or upstream call occurs
//! - Checks are ordered cheapest-first: method, content type, body shape
//! - Batched (array) envelopes are rejected outright, not unwrapped

use axum::http::{header, HeaderMap, Method};
use serde_json::{Map, Value};

use crate::error::GuardError;

/// A validated GraphQL request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub query: String,
    pub variables: Option<Map<String, Value>>,
    pub operation_name: Option<String>,
}

/// Only POST reaches the parser.
pub fn check_method(method: &Method) -> Result<(), GuardError> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(GuardError::MethodNotAllowed)
    }
}

/// Content-Type must be `application/json`; parameters are tolerated.
pub fn check_content_type(headers: &HeaderMap) -> Result<(), GuardError> {
    let media = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if media == "application/json" {
        Ok(())
    } else {
        Err(GuardError::UnsupportedContentType)
    }
}

/// Parse and structurally validate the raw body.
pub fn parse_envelope(body: &[u8], max_query_length: usize) -> Result<RequestEnvelope, GuardError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| GuardError::InvalidJson)?;

    if value.is_array() {
        return Err(GuardError::BatchingNotSupported);
    }
    let Value::Object(mut map) = value else {
        return Err(GuardError::InvalidRequestBody);
    };

    let query = match map.remove("query") {
        Some(Value::String(query)) => query,
        _ => return Err(GuardError::InvalidQuery),
    };
    if query.len() > max_query_length {
        return Err(GuardError::QueryTooLarge {
            length: query.len(),
            max: max_query_length,
        });
    }

    let variables = match map.remove("variables") {
        None | Some(Value::Null) => None,
        Some(Value::Object(variables)) => Some(variables),
        Some(_) => return Err(GuardError::InvalidVariables),
    };

    let operation_name = match map.remove("operationName") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name),
        Some(_) => return Err(GuardError::InvalidOperationName),
    };

    Ok(RequestEnvelope {
        query,
        variables,
        operation_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(body: Value) -> Result<RequestEnvelope, GuardError> {
        parse_envelope(body.to_string().as_bytes(), 1000)
    }

    #[test]
    fn accepts_minimal_envelope() {
        let parsed = envelope(json!({"query": "{ health }"})).unwrap();
        assert_eq!(parsed.query, "{ health }");
        assert!(parsed.variables.is_none());
        assert!(parsed.operation_name.is_none());
    }

    #[test]
    fn accepts_full_envelope() {
        let parsed = envelope(json!({
            "query": "query A($x: Int) { health }",
            "variables": {"x": 1},
            "operationName": "A",
        }))
        .unwrap();
        assert!(parsed.variables.is_some());
        assert_eq!(parsed.operation_name.as_deref(), Some("A"));
    }

    #[test]
    fn null_variables_and_operation_name_are_absent() {
        let parsed = envelope(json!({
            "query": "{ health }",
            "variables": null,
            "operationName": null,
        }))
        .unwrap();
        assert!(parsed.variables.is_none());
        assert!(parsed.operation_name.is_none());
    }

    #[test]
    fn rejects_each_malformed_shape() {
        assert_eq!(
            parse_envelope(b"not json", 1000),
            Err(GuardError::InvalidJson)
        );
        assert_eq!(envelope(json!([{"query": "{ health }"}])), Err(GuardError::BatchingNotSupported));
        assert_eq!(envelope(json!("just a string")), Err(GuardError::InvalidRequestBody));
        assert_eq!(envelope(json!({"variables": {}})), Err(GuardError::InvalidQuery));
        assert_eq!(envelope(json!({"query": 42})), Err(GuardError::InvalidQuery));
        assert_eq!(
            envelope(json!({"query": "{ health }", "variables": [1]})),
            Err(GuardError::InvalidVariables)
        );
        assert_eq!(
            envelope(json!({"query": "{ health }", "operationName": 7})),
            Err(GuardError::InvalidOperationName)
        );
    }

    #[test]
    fn rejects_oversized_query() {
        let query = "x".repeat(1001);
        assert_eq!(
            envelope(json!({"query": query})),
            Err(GuardError::QueryTooLarge { length: 1001, max: 1000 })
        );
    }

    #[test]
    fn method_and_content_type_checks() {
        assert!(check_method(&Method::POST).is_ok());
        assert_eq!(check_method(&Method::GET), Err(GuardError::MethodNotAllowed));

        let mut headers = HeaderMap::new();
        assert_eq!(
            check_content_type(&headers),
            Err(GuardError::UnsupportedContentType)
        );
        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert!(check_content_type(&headers).is_ok());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert_eq!(
            check_content_type(&headers),
            Err(GuardError::UnsupportedContentType)
        );
    }
}
