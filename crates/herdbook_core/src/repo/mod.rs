//! Persistence layer: row mapping, visibility queries and the entity store.
//!
//! # Responsibility
//! - Keep SQL details inside the core persistence boundary.
//! - Give business code active-only reads by default.
//!
//! # Invariants
//! - Every delete and restore goes through the lifecycle engine.

pub mod entity_store;
pub mod query;
mod rows;
pub mod table;

pub use entity_store::EntityStore;
pub use query::{Query, SortOrder, Visibility};
pub use table::TableRow;
