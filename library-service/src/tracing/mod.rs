//! Tracing and observability module.
//!
//! Provides distributed tracing capabilities for the library service.

/// Tracer configuration and initialization.
pub mod tracer;
