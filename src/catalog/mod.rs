//! Catalog entities and their handlers.
//!
//! - `table`: single-table engine and the [`EntityHandler`] capability
//! - `document`, `order`, `copy`: composite and keyed entities
//! - `lookup`: read-only label tables and the credential store
//! - `router`: [`Dispatcher`], the public entry point

pub mod copy;
pub mod document;
pub mod entity;
pub mod lookup;
pub mod order;
pub mod projection;
pub mod router;
pub mod table;

pub use entity::{Entity, LookupTable};
pub use router::{Dispatcher, Handler};
pub use table::{EntityHandler, TableHandler};
