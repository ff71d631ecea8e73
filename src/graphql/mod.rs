//! GraphQL engine configuration.
//!
//! # Data Flow
//! ```text
//! guarded envelope
//!     → schema.rs (async-graphql schema, introspection toggle)
//!     → rules.rs (depth / field / operation extensions, pre-execution)
//!     → resolvers (health, upstreamGet)
//!     → format.rs (production error shaping)
//! ```
//!
//! # Design Decisions
//! - Execution is the stock async-graphql engine; this crate only
//!   configures it with pluggable validation extensions
//! - Each rule re-derives document stats independently, so rules can be
//!   enabled or replaced in isolation
//! - Error shaping is a post-execution rewrite, never an in-resolver concern

pub mod complexity;
pub mod format;
pub mod rules;
pub mod schema;

pub use schema::{build_schema, GatewaySchema};
