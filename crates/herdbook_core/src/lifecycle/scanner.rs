//! Protection scanner: finds dependents that block a delete.
//!
//! # Invariants
//! - Only relations that are navigable and not compositions are queried.
//! - Active (`is_deleted = 0`) source rows block both delete modes.
//! - A hard delete is also blocked by trashed rows of `Restrict` relations,
//!   since the foreign key would refuse it.
//! - One-to-many relations stop at the first matching row; nothing is
//!   counted.
//! - The scan is read-only.

use crate::lifecycle::engine::DeleteMode;
use crate::lifecycle::error::{
    ConflictingRelation, DependentState, LifecycleResult, ProtectedError,
};
use crate::lifecycle::relations::{Cardinality, RelationDescriptor, RelationRegistry};
use crate::model::entity::{EntityId, EntityRef};
use rusqlite::{Connection, OptionalExtension};

/// Outcome of a protection scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionCheck {
    target: EntityRef,
    mode: DeleteMode,
    conflicts: Vec<ConflictingRelation>,
}

impl DeletionCheck {
    pub fn target(&self) -> EntityRef {
        self.target
    }

    /// Delete mode the check was made for.
    pub fn mode(&self) -> DeleteMode {
        self.mode
    }

    pub fn is_allowed(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn conflicts(&self) -> &[ConflictingRelation] {
        &self.conflicts
    }

    pub fn into_result(self) -> Result<(), ProtectedError> {
        if self.conflicts.is_empty() {
            return Ok(());
        }
        Err(ProtectedError::new(self.target, self.conflicts))
    }
}

/// Checks every registered relation that targets `target.kind`.
pub fn scan(
    conn: &Connection,
    registry: &RelationRegistry,
    target: EntityRef,
    mode: DeleteMode,
) -> LifecycleResult<DeletionCheck> {
    let mut conflicts = Vec::new();
    for relation in registry.targeting(target.kind) {
        let Some(accessor) = relation.accessor else {
            continue;
        };
        if relation.cascade_on_delete {
            continue;
        }
        let state = if has_dependent(conn, relation, target.id, DependentState::Active)? {
            Some(DependentState::Active)
        } else if mode == DeleteMode::Hard
            && relation.blocks_purge_when_trashed()
            && has_dependent(conn, relation, target.id, DependentState::Trashed)?
        {
            Some(DependentState::Trashed)
        } else {
            None
        };
        if let Some(state) = state {
            conflicts.push(ConflictingRelation::from_descriptor(relation, accessor, state));
        }
    }

    Ok(DeletionCheck {
        target,
        mode,
        conflicts,
    })
}

fn has_dependent(
    conn: &Connection,
    relation: &RelationDescriptor,
    target_id: EntityId,
    state: DependentState,
) -> LifecycleResult<bool> {
    let table = relation.source.table();
    let field = relation.target_field;
    // Self-referencing relations (sire/dam) must not match the row itself.
    let exclude_self = if relation.source == relation.target {
        " AND id <> ?1"
    } else {
        ""
    };
    let deleted_flag = match state {
        DependentState::Active => 0,
        DependentState::Trashed => 1,
    };
    let id = target_id.to_string();

    match relation.cardinality {
        Cardinality::OneToOne => {
            let sql = format!(
                "SELECT id FROM {table}
                 WHERE {field} = ?1 AND is_deleted = {deleted_flag}{exclude_self}
                 LIMIT 1;"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let found = stmt
                .query_row([id.as_str()], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(found.is_some())
        }
        Cardinality::OneToMany => {
            let sql = format!(
                "SELECT EXISTS(
                    SELECT 1 FROM {table}
                    WHERE {field} = ?1 AND is_deleted = {deleted_flag}{exclude_self}
                );"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let exists = stmt.query_row([id.as_str()], |row| row.get::<_, i64>(0))?;
            Ok(exists == 1)
        }
    }
}
