//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request_id.rs (read-or-generate x-request-id, echoed on response)
//!     → rate limit → auth gate          (graphql route only)
//!     → graphql.rs (guard → engine → error shaping)
//!     → health.rs (/health, /live, /ready)
//! ```
//!
//! # Design Decisions
//! - `/graphql` is routed for every method; the guard shapes the 405 so
//!   all rejections share the GraphQL error envelope
//! - Health endpoints sit outside auth and rate limiting

pub mod graphql;
pub mod health;
pub mod request_id;
pub mod server;

pub use server::HttpServer;
