//! Catalog Access Library
//!
//! Generic CRUD dispatch over a media-catalog database (SQLite, PostgreSQL,
//! MySQL). Entities split across several tables are kept consistent by
//! running every multi-statement operation in one transaction.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sql;

pub use catalog::Dispatcher;
pub use config::Config;
pub use db::Database;
pub use error::{DbError, DbResult};
