//! Error taxonomy of the entity lifecycle.
//!
//! Structural conflicts (`Protected`) and business conflicts (`Validation`)
//! are distinct variants so callers can present them differently. Storage
//! failures pass through as `Db` and are never reinterpreted.

use crate::db::DbError;
use crate::lifecycle::relations::{Cardinality, RelationDescriptor};
use crate::model::entity::{EntityId, EntityKind, EntityRef};
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Which rows of a relation block the delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentState {
    /// At least one active row.
    Active,
    /// Only trashed rows, which still hold the foreign key on a purge.
    Trashed,
}

/// One registered relation that still has rows pointing at the entity being
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictingRelation {
    pub source: EntityKind,
    pub field: &'static str,
    pub accessor: &'static str,
    pub cardinality: Cardinality,
    pub state: DependentState,
}

impl ConflictingRelation {
    pub(crate) fn from_descriptor(
        descriptor: &RelationDescriptor,
        accessor: &'static str,
        state: DependentState,
    ) -> Self {
        Self {
            source: descriptor.source,
            field: descriptor.target_field,
            accessor,
            cardinality: descriptor.cardinality,
            state,
        }
    }
}

impl Display for ConflictingRelation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}.{})",
            self.accessor,
            self.source.table(),
            self.field
        )?;
        if self.state == DependentState::Trashed {
            f.write_str(" in trash")?;
        }
        Ok(())
    }
}

/// Delete refused because dependents still exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedError {
    target: EntityRef,
    conflicts: Vec<ConflictingRelation>,
}

impl ProtectedError {
    pub(crate) fn new(target: EntityRef, conflicts: Vec<ConflictingRelation>) -> Self {
        Self { target, conflicts }
    }

    pub fn target(&self) -> EntityRef {
        self.target
    }

    pub fn conflicts(&self) -> &[ConflictingRelation] {
        &self.conflicts
    }

    /// Accessor names of the blocking relations, in registry order.
    pub fn accessors(&self) -> Vec<&'static str> {
        self.conflicts.iter().map(|conflict| conflict.accessor).collect()
    }
}

impl Display for ProtectedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot delete {} {} because it is still referenced by: ",
            self.target.kind.label(),
            self.target.id
        )?;
        for (index, conflict) in self.conflicts.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{conflict}")?;
        }
        Ok(())
    }
}

impl Error for ProtectedError {}

/// Failure of any lifecycle operation.
#[derive(Debug)]
pub enum LifecycleError {
    /// Structural conflict: rows still reference the target.
    Protected(ProtectedError),
    /// Business conflict with a user-facing message.
    Validation(ValidationError),
    /// Target does not exist under the visibility the operation uses.
    NotFound { kind: EntityKind, id: EntityId },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Query referenced a column the entity does not declare.
    UnknownColumn {
        kind: EntityKind,
        column: String,
    },
    /// A read-only query surface was handed a writing statement.
    ReadOnlyViolation,
}

impl LifecycleError {
    /// Stable code for logs and callers that branch on failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Protected(_) => "protected",
            Self::Validation(err) => err.code(),
            Self::NotFound { .. } => "not_found",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::ReadOnlyViolation => "read_only_violation",
        }
    }

    pub(crate) fn not_found(target: EntityRef) -> Self {
        Self::NotFound {
            kind: target.kind,
            id: target.id,
        }
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protected(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.label()),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "entity store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::UnknownColumn { kind, column } => {
                write!(f, "unknown column `{column}` for {}", kind.label())
            }
            Self::ReadOnlyViolation => {
                f.write_str("statement would write through a read-only view")
            }
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Protected(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::UnknownColumn { .. } => None,
            Self::ReadOnlyViolation => None,
        }
    }
}

impl From<ProtectedError> for LifecycleError {
    fn from(value: ProtectedError) -> Self {
        Self::Protected(value)
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for LifecycleError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LifecycleError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Hook or holder registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    DuplicateHook(String),
    DuplicateHolder(String),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateHook(name) => write!(f, "delete hook already registered: {name}"),
            Self::DuplicateHolder(name) => {
                write!(f, "polymorphic holder already registered: {name}")
            }
        }
    }
}

impl Error for RegistrationError {}
