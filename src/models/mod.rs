//! Data models for the catalog access layer.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, DatabaseType};
pub use query::{
    DEFAULT_QUERY_TIMEOUT_SECS, FieldMap, MAX_QUERY_TIMEOUT_SECS, QueryParam, Row,
};
