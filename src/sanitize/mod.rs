//! Response sanitization.
//!
//! # Data Flow
//! ```text
//! upstream JSON value
//!     → redact (recursive walk, sensitive keys replaced)
//!     → filter_keys (top-level include/exclude narrowing)
//!     → value returned to the resolver
//! ```
//!
//! # Design Decisions
//! - JSON is modeled as `serde_json::Value`, a tagged union walked by one
//!   explicit recursive function per variant; the depth cap is total
//! - `serde_json::Value` trees are acyclic by construction, so no cycle
//!   guard is required
//! - Prototype-pollution vector keys are always redacted/dropped, even when
//!   an include set names them

use serde_json::{Map, Value};

/// Marker substituted for a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Marker substituted for values beyond the recursion cap.
pub const TRUNCATED: &str = "[TRUNCATED]";

/// Maximum recursion depth for the redaction walk.
const MAX_DEPTH: usize = 32;

/// Keys that are never forwarded, regardless of include/exclude sets.
const BLOCKED_KEYS: [&str; 3] = ["__proto__", "prototype", "constructor"];

/// Substrings (after lowercasing and stripping `-`/`_`/space) that mark a
/// key as sensitive.
const SENSITIVE_MARKERS: [&str; 6] = [
    "password",
    "passphrase",
    "secret",
    "token",
    "authorization",
    "cookie",
];

/// True for keys whose values must never pass through the gateway.
pub fn is_sensitive_key(key: &str) -> bool {
    if BLOCKED_KEYS.contains(&key) {
        return true;
    }
    let normalized: String = key
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect();
    if normalized.contains("apikey") {
        return true;
    }
    SENSITIVE_MARKERS.iter().any(|m| normalized.contains(m))
}

/// Recursively replace sensitive values with [`REDACTED`].
///
/// Matched keys are replaced without recursing into their values. Depth is
/// capped at [`MAX_DEPTH`]; anything deeper becomes [`TRUNCATED`].
pub fn redact(value: &Value) -> Value {
    redact_at(value, 0)
}

fn redact_at(value: &Value, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return Value::String(TRUNCATED.to_string());
    }
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    out.insert(key.clone(), redact_at(inner, depth + 1));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| redact_at(v, depth + 1)).collect())
        }
        scalar => scalar.clone(),
    }
}

/// Narrow a top-level object to an include/exclude key set.
///
/// Non-objects and empty key sets pass through unchanged. Blocked keys are
/// dropped even when the include set names them. Only the top level is
/// filtered; nested objects are left to `redact`.
pub fn filter_keys(value: Value, include: Option<&[String]>, exclude: Option<&[String]>) -> Value {
    let include = include.filter(|keys| !keys.is_empty());
    let exclude = exclude.filter(|keys| !keys.is_empty());
    if include.is_none() && exclude.is_none() {
        return value;
    }

    let Value::Object(map) = value else {
        return value;
    };

    let mut out = Map::new();
    for (key, inner) in map {
        if BLOCKED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(keep) = include {
            if !keep.iter().any(|k| k == &key) {
                continue;
            }
        }
        if let Some(drop) = exclude {
            if drop.iter().any(|k| k == &key) {
                continue;
            }
        }
        out.insert(key, inner);
    }
    Value::Object(out)
}
