//! Core domain logic for the herdbook farm back office.
//! This crate is the single source of truth for entity lifecycle rules:
//! soft/hard delete, restore, and the protection checks that gate them.

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use lifecycle::{
    ConflictingRelation, DeleteMode, DeleteOutcome, DeletionCheck, DependentState,
    LifecycleEngine, LifecycleError, LifecycleResult, OnHardDelete, ProtectedError,
    RestoreOutcome,
};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::breeding::{
    BreedingEvent, Calving, PregnancyCheck, PregnancyResult, ReproductiveSeason,
};
pub use model::commerce::{AssetRef, Partner, Transaction, TransactionItem, TransactionKind};
pub use model::entity::{Entity, EntityId, EntityKind, EntityMeta, EntityRef, SoftDeletable};
pub use model::health::{Medication, SanitaryEvent, SanitaryEventTarget};
pub use model::herd::{Cattle, Location, Sex};
pub use model::movement::{Movement, MovementAnimal, MovementReason};
pub use model::nutrition::{Diet, DietItem, FeedIngredient, FeedingEvent};
pub use model::task::{Task, TaskPriority, TaskStatus};
pub use model::user::User;
pub use model::validation::ValidationError;
pub use model::weight::{WeighingSession, WeightRecord};
pub use repo::{EntityStore, Query, SortOrder, TableRow, Visibility};
pub use service::{TransactionService, TrashService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
