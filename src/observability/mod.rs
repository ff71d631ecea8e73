//! Observability subsystem.
//!
//! # Responsibilities
//! - Structured logging via `tracing` (initialized in main)
//! - Counters and latency histograms via the `metrics` facade
//! - Prometheus exposition on a dedicated address when enabled
//!
//! # Design Decisions
//! - Log fields carry the request id and error code, never payloads
//! - Metric labels are low-cardinality (status class, error code)

pub mod metrics;
