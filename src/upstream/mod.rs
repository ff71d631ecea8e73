//! Bounded upstream HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! resolver (path, forwarded headers)
//!     → path.rs (safety + prefix allowlist)
//!     → client.rs (single GET, one timeout, streamed size cap)
//!     → parsed JSON or raw text back to the resolver
//! ```
//!
//! # Design Decisions
//! - One outbound call per resolver invocation; no retries anywhere
//! - Timeout and size cap share one cancellation path: dropping the
//!   in-flight body aborts the connection
//! - Redirects are never followed; 3xx is an error

pub mod client;
pub mod path;

pub use client::{UpstreamBody, UpstreamClient};
