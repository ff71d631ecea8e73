//! Production error shaping.
//!
//! # Responsibilities
//! - Pass errors through verbatim outside production
//! - Flatten unclassified errors to a generic INTERNAL_SERVER_ERROR
//! - Allowlist the extension fields each domain code may expose
//!
//! # Design Decisions
//! - Shaping is a rewrite of `Response.errors` after execution; resolvers
//!   and rules never know which mode the process runs in
//! - Location and path metadata survive flattening (clients need them for
//!   error mapping); messages and foreign extensions do not
//! - An unknown-but-coded error keeps its message and exposes only `{code}`

use async_graphql::{ErrorExtensionValues, ServerError, Value};

/// Generic replacement for unclassified errors in production.
const INTERNAL_CODE: &str = "INTERNAL_SERVER_ERROR";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Extension fields each domain code is allowed to expose in production.
/// Codes absent from this table expose `code` only.
const EXTENSION_ALLOWLIST: &[(&str, &[&str])] = &[
    ("QUERY_TOO_DEEP", &["depth", "maxDepth"]),
    ("QUERY_TOO_COMPLEX", &["fieldCount", "maxFields"]),
    ("TOO_MANY_OPERATIONS", &["operationCount", "maxOperations"]),
    ("QUERY_TOO_LARGE", &["queryLength", "maxQueryLength"]),
    ("UPSTREAM_ERROR", &["status"]),
    ("UPSTREAM_RESPONSE_TOO_LARGE", &["maxResponseBytes"]),
    ("UPSTREAM_TIMEOUT", &["timeoutMs"]),
];

/// Rewrite execution errors for the wire.
///
/// Outside production everything passes through verbatim for debuggability.
pub fn shape_errors(errors: &mut [ServerError], production: bool) {
    if !production {
        return;
    }
    for error in errors.iter_mut() {
        match error_code(error) {
            Some(code) => allowlist_extensions(error, &code),
            None => flatten(error),
        }
    }
}

fn error_code(error: &ServerError) -> Option<String> {
    error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .and_then(|value| match value {
            Value::String(code) => Some(code.clone()),
            _ => None,
        })
}

/// Replace an unclassified error with the generic internal error, keeping
/// only protocol-required location/path metadata.
fn flatten(error: &mut ServerError) {
    error.message = INTERNAL_MESSAGE.to_string();
    let mut ext = ErrorExtensionValues::default();
    ext.set("code", INTERNAL_CODE);
    error.extensions = Some(ext);
}

/// Keep the message; restrict extensions to the fields declared safe for
/// this code.
fn allowlist_extensions(error: &mut ServerError, code: &str) {
    let allowed: &[&str] = EXTENSION_ALLOWLIST
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[]);

    let mut shaped = ErrorExtensionValues::default();
    shaped.set("code", code);
    if let Some(existing) = &error.extensions {
        for field in allowed {
            if let Some(value) = existing.get(field) {
                shaped.set(*field, value.clone());
            }
        }
    }
    error.extensions = Some(shaped);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coded_error(code: &str, fields: &[(&str, u64)]) -> ServerError {
        let mut ext = ErrorExtensionValues::default();
        ext.set("code", code);
        for (name, value) in fields {
            ext.set(*name, *value);
        }
        let mut error = ServerError::new("boom with internal detail", None);
        error.extensions = Some(ext);
        error
    }

    fn get(error: &ServerError, name: &str) -> Option<Value> {
        error.extensions.as_ref().and_then(|e| e.get(name)).cloned()
    }

    #[test]
    fn non_production_passes_everything_through() {
        let mut errors = vec![ServerError::new("secret detail", None)];
        shape_errors(&mut errors, false);
        assert_eq!(errors[0].message, "secret detail");
        assert!(errors[0].extensions.is_none());
    }

    #[test]
    fn unclassified_error_flattens_in_production() {
        let mut errors = vec![ServerError::new("panicked at src/internal.rs:42", None)];
        shape_errors(&mut errors, true);
        assert_eq!(errors[0].message, "Internal server error");
        assert_eq!(get(&errors[0], "code"), Some(Value::from(INTERNAL_CODE)));
    }

    #[test]
    fn domain_error_keeps_message_and_allowed_fields() {
        let mut errors = vec![coded_error(
            "QUERY_TOO_DEEP",
            &[("depth", 12), ("maxDepth", 10), ("internalHint", 7)],
        )];
        shape_errors(&mut errors, true);
        assert_eq!(errors[0].message, "boom with internal detail");
        assert_eq!(get(&errors[0], "depth"), Some(Value::from(12u64)));
        assert_eq!(get(&errors[0], "maxDepth"), Some(Value::from(10u64)));
        assert_eq!(get(&errors[0], "internalHint"), None);
    }

    #[test]
    fn upstream_error_exposes_status_only() {
        let mut errors = vec![coded_error("UPSTREAM_ERROR", &[("status", 502)])];
        shape_errors(&mut errors, true);
        assert_eq!(get(&errors[0], "status"), Some(Value::from(502u64)));
    }

    #[test]
    fn unknown_code_exposes_code_only() {
        let mut errors = vec![coded_error("UPSTREAM_FETCH_FAILED", &[("detail", 1)])];
        shape_errors(&mut errors, true);
        assert_eq!(errors[0].message, "boom with internal detail");
        assert_eq!(
            get(&errors[0], "code"),
            Some(Value::from("UPSTREAM_FETCH_FAILED"))
        );
        assert_eq!(get(&errors[0], "detail"), None);
    }
}
