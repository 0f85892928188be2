//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Statement execution with timeouts
//! - Scoped transactions
//! - Type mappings from driver rows to JSON field maps

pub mod executor;
pub mod pool;
pub mod transaction;
pub mod types;

pub use executor::{Database, Executor};
pub use pool::DbPool;
pub use transaction::{DbTransaction, Transaction};
