//! Lifecycle coordination.
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown signal out to every
//!   long-running task; tests use it to stop servers deterministically

pub mod shutdown;

pub use shutdown::Shutdown;
