//! Domain model for the herdbook back office.
//!
//! # Responsibility
//! - Define the entity base (`EntityMeta`, `Entity`, `SoftDeletable`).
//! - Define the farm entities whose deletion the lifecycle engine guards.
//!
//! # Invariants
//! - Every entity embeds exactly one `EntityMeta`.
//! - Field checks live in `Entity::validate` and never touch storage.

pub mod breeding;
pub mod commerce;
pub mod entity;
pub mod health;
pub mod herd;
pub mod movement;
pub mod nutrition;
pub mod task;
pub mod user;
pub mod validation;
pub mod weight;
