//! Observability infrastructure.
//!
//! Provides:
//! - Structured tracing setup for the binary and for tests

pub mod tracing;
