//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (read & parse variables)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved exactly once at startup; no component reads the
//!   environment afterwards, so tests construct arbitrary configs directly
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (parse) from semantic checks

pub mod env;
pub mod schema;
pub mod validation;

pub use schema::CorsOrigins;
pub use schema::Environment;
pub use schema::GatewayConfig;
pub use schema::UpstreamConfig;
