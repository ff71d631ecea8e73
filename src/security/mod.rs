//! Security middleware.
//!
//! # Design Decisions
//! - The rate limiter is the only shared mutable state on the request
//!   path; everything else is per-request or read-only config
//! - Clients are keyed by API-key fingerprint when authenticated, client
//!   IP otherwise

pub mod rate_limit;
