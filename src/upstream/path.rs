//! Upstream path safety checks.
//!
//! A path is forwarded verbatim to the upstream, so it is validated rather
//! than normalized: anything suspicious is rejected, never rewritten.

use crate::error::PathError;

/// Validate a caller-supplied upstream path.
///
/// Rules: must start with `/`; no `..` segment; no scheme separator
/// (`://`); no backslash; no NUL or ASCII control characters. When an
/// allowlist is configured the path must additionally start with one of its
/// prefixes.
pub fn check_path(path: &str, allowed_prefixes: &[String]) -> Result<(), PathError> {
    if !path.starts_with('/') {
        return Err(PathError::Invalid);
    }
    if path.contains("://") || path.contains('\\') {
        return Err(PathError::Invalid);
    }
    if path.chars().any(|c| c.is_ascii_control()) {
        return Err(PathError::Invalid);
    }
    if path.split(['/', '?', '#']).any(|segment| segment == "..") {
        return Err(PathError::Invalid);
    }

    if !allowed_prefixes.is_empty()
        && !allowed_prefixes.iter().any(|prefix| path.starts_with(prefix))
    {
        return Err(PathError::NotAllowed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_paths() {
        assert!(check_path("/api/items", &[]).is_ok());
        assert!(check_path("/api/items?page=2", &[]).is_ok());
        assert!(check_path("/", &[]).is_ok());
    }

    #[test]
    fn rejects_traversal_regardless_of_allowlist() {
        assert_eq!(check_path("/api/../secret", &[]), Err(PathError::Invalid));
        let allow = vec!["/api".to_string()];
        assert_eq!(check_path("/api/../secret", &allow), Err(PathError::Invalid));
        // ".." hidden inside a longer segment is not traversal
        assert!(check_path("/api/..hidden", &[]).is_ok());
    }

    #[test]
    fn rejects_absolute_urls_and_backslashes() {
        assert_eq!(check_path("http://evil/", &[]), Err(PathError::Invalid));
        assert_eq!(check_path("/a://b", &[]), Err(PathError::Invalid));
        assert_eq!(check_path("/a\\b", &[]), Err(PathError::Invalid));
        assert_eq!(check_path("relative/path", &[]), Err(PathError::Invalid));
    }

    #[test]
    fn rejects_control_characters() {
        assert_eq!(check_path("/a\u{0}b", &[]), Err(PathError::Invalid));
        assert_eq!(check_path("/a\r\nHost: x", &[]), Err(PathError::Invalid));
    }

    #[test]
    fn enforces_prefix_allowlist() {
        let allow = vec!["/api/".to_string(), "/public/".to_string()];
        assert!(check_path("/api/items", &allow).is_ok());
        assert!(check_path("/public/info", &allow).is_ok());
        assert_eq!(check_path("/internal/items", &allow), Err(PathError::NotAllowed));
    }
}
