//! Library catalog service.
//!
//! A gRPC service managing books and their authors on top of a relational
//! store. Every multi-statement write runs inside a single transaction, and
//! storage constraint violations surface as domain errors.

/// gRPC request handlers.
pub mod adapter;

/// Catalog operations invoked by the request handlers.
pub mod catalog;

/// Application configuration.
pub mod config;

/// Application errors.
pub mod error;

/// Store adapters and the transaction helper.
pub mod repository;

/// Tracing and observability.
pub mod tracing;
