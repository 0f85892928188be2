//! Statement builder.
//!
//! Pure functions turning field maps into parameterized SQL:
//! - equality conjunctions for WHERE clauses
//! - column/placeholder lists for INSERT
//! - assignment lists for UPDATE
//! - rendering of named placeholders for each backend

pub mod builder;
pub mod render;

pub use builder::{Statement, validate_identifier};
pub use render::RenderedStatement;
