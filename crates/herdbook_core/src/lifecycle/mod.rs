//! Entity lifecycle engine: soft/hard delete, restore and protection.
//!
//! # Responsibility
//! - Decide whether a delete may proceed (`relations`, `scanner`,
//!   `polymorphic`, `hooks`).
//! - Perform the delete or restore atomically (`engine`).
//!
//! # Invariants
//! - Every check runs for soft and hard deletes alike.
//! - SQLite foreign keys are a backstop; each relation records the
//!   foreign-key action it mirrors, so a refused purge is reported before
//!   SQLite would reject it.

pub mod engine;
pub mod error;
pub mod hooks;
pub mod polymorphic;
pub mod relations;
pub mod scanner;
pub mod uniqueness;
pub mod view;
pub(crate) mod write_scope;

pub use engine::{
    herdbook_engine, DeleteMode, DeleteOutcome, LifecycleEngine, RestoreOutcome,
};
pub use error::{
    ConflictingRelation, DependentState, LifecycleError, LifecycleResult, ProtectedError,
    RegistrationError,
};
pub use hooks::{DeleteHook, HookRegistry, LastSuperuserHook, MedicationUsageHook};
pub use polymorphic::{PolymorphicGuard, PolymorphicHolder, TransactionLineItems};
pub use relations::{
    herdbook_relations, Cardinality, OnHardDelete, RelationDescriptor, RelationRegistry,
    HERDBOOK_RELATIONS,
};
pub use scanner::DeletionCheck;
pub use uniqueness::{UniquenessInvariant, HERDBOOK_UNIQUENESS};
pub use view::ReadView;
