//! Delete/restore orchestration.
//!
//! # Responsibility
//! - Run hooks, the protection scanner and the polymorphic guard, then the
//!   single mutation, inside one write scope: an `IMMEDIATE` transaction,
//!   or a savepoint when the caller already has a transaction open.
//! - Emit metadata-only lifecycle log events.
//!
//! # Invariants
//! - Check order is hooks, scanner, guard. The first failure aborts and the
//!   scope is rolled back on drop; nothing is mutated.
//! - The scanner runs in the mode of the delete, so a hard delete is refused
//!   as `Protected` before a foreign key could refuse it.
//! - Soft delete resolves its target among active rows; hard delete among
//!   all rows.
//! - `modified_at` strictly increases on every mutation.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::hooks::HookRegistry;
use crate::lifecycle::polymorphic::PolymorphicGuard;
use crate::lifecycle::relations::{herdbook_relations, RelationRegistry};
use crate::lifecycle::scanner::{scan, DeletionCheck};
use crate::lifecycle::uniqueness::ensure_restorable;
use crate::lifecycle::view::ReadView;
use crate::lifecycle::write_scope::WriteScope;
use crate::model::entity::{now_epoch_ms, EntityId, EntityKind, EntityRef};
use log::{info, warn};
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension};
use std::sync::Arc;
use std::time::Instant;

static HERDBOOK_ENGINE: Lazy<LifecycleEngine> = Lazy::new(LifecycleEngine::herdbook);

/// Shared engine with the herdbook relations, holders and hooks.
pub fn herdbook_engine() -> &'static LifecycleEngine {
    &HERDBOOK_ENGINE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Reversible: flips `is_deleted`.
    #[default]
    Soft,
    /// Irreversible row removal.
    Hard,
}

impl DeleteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub target: EntityRef,
    pub mode: DeleteMode,
    /// New `modified_at` of a soft-deleted row; `None` after a hard delete.
    pub modified_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub target: EntityRef,
    pub modified_at: i64,
    /// `false` when the entity was already active and nothing changed.
    pub was_deleted: bool,
}

#[derive(Clone)]
pub struct LifecycleEngine {
    relations: Arc<RelationRegistry>,
    guard: PolymorphicGuard,
    hooks: HookRegistry,
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::herdbook()
    }
}

impl LifecycleEngine {
    pub fn new(
        relations: Arc<RelationRegistry>,
        guard: PolymorphicGuard,
        hooks: HookRegistry,
    ) -> Self {
        Self {
            relations,
            guard,
            hooks,
        }
    }

    pub fn herdbook() -> Self {
        Self::new(
            herdbook_relations(),
            PolymorphicGuard::herdbook(),
            HookRegistry::herdbook(),
        )
    }

    pub fn relations(&self) -> &RelationRegistry {
        &self.relations
    }

    pub fn guard(&self) -> &PolymorphicGuard {
        &self.guard
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Structural pre-flight check of a soft delete for UI use. Read-only.
    pub fn can_delete(
        &self,
        conn: &Connection,
        kind: EntityKind,
        id: EntityId,
    ) -> LifecycleResult<DeletionCheck> {
        self.check_delete(conn, EntityRef::new(kind, id), DeleteMode::Soft)
    }

    /// Pre-flight check of a hard delete. Also reports trashed dependents
    /// that would keep the row alive.
    pub fn can_purge(
        &self,
        conn: &Connection,
        kind: EntityKind,
        id: EntityId,
    ) -> LifecycleResult<DeletionCheck> {
        self.check_delete(conn, EntityRef::new(kind, id), DeleteMode::Hard)
    }

    pub fn check_delete(
        &self,
        conn: &Connection,
        target: EntityRef,
        mode: DeleteMode,
    ) -> LifecycleResult<DeletionCheck> {
        scan(conn, &self.relations, target, mode)
    }

    /// Deletes `target` after every check passes.
    ///
    /// # Errors
    /// - `NotFound` when the row is missing (or already trashed, for soft).
    /// - `Validation` from a hook or the polymorphic guard.
    /// - `Protected` when active dependents exist, or for a hard delete when
    ///   trashed rows still hold a restricting foreign key.
    pub fn delete(
        &self,
        conn: &Connection,
        target: EntityRef,
        mode: DeleteMode,
    ) -> LifecycleResult<DeleteOutcome> {
        let started_at = Instant::now();
        let result = self.delete_in_transaction(conn, target, mode);
        log_outcome("entity_delete", target, mode.as_str(), started_at, &result);
        result
    }

    /// Clears the trash flag after re-validating uniqueness invariants.
    pub fn restore(&self, conn: &Connection, target: EntityRef) -> LifecycleResult<RestoreOutcome> {
        let started_at = Instant::now();
        let result = restore_in_transaction(conn, target);
        log_outcome("entity_restore", target, "restore", started_at, &result);
        result
    }

    fn delete_in_transaction(
        &self,
        conn: &Connection,
        target: EntityRef,
        mode: DeleteMode,
    ) -> LifecycleResult<DeleteOutcome> {
        let tx = WriteScope::begin(conn)?;
        let is_deleted = load_deleted_flag(&tx, target)?;
        if mode == DeleteMode::Soft && is_deleted {
            return Err(LifecycleError::not_found(target));
        }

        let view = ReadView::new(&tx);
        self.hooks.run(target, &view)?;
        scan(&tx, &self.relations, target, mode)?.into_result()?;
        self.guard.check_polymorphic_references(target, &view)?;

        let table = target.kind.table();
        let id = target.id.to_string();
        let modified_at = match mode {
            DeleteMode::Soft => {
                let modified_at = tx.query_row(
                    &format!(
                        "UPDATE {table}
                         SET is_deleted = 1, modified_at = MAX(?2, modified_at + 1)
                         WHERE id = ?1
                         RETURNING modified_at;"
                    ),
                    rusqlite::params![id, now_epoch_ms()],
                    |row| row.get::<_, i64>(0),
                )?;
                Some(modified_at)
            }
            DeleteMode::Hard => {
                tx.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id.as_str()])?;
                None
            }
        };
        tx.commit()?;

        Ok(DeleteOutcome {
            target,
            mode,
            modified_at,
        })
    }
}

fn restore_in_transaction(conn: &Connection, target: EntityRef) -> LifecycleResult<RestoreOutcome> {
    let tx = WriteScope::begin(conn)?;
    let table = target.kind.table();
    let id = target.id.to_string();

    let (is_deleted, current_modified_at) = tx
        .query_row(
            &format!("SELECT is_deleted, modified_at FROM {table} WHERE id = ?1;"),
            [id.as_str()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?
        .ok_or_else(|| LifecycleError::not_found(target))?;

    if is_deleted == 0 {
        return Ok(RestoreOutcome {
            target,
            modified_at: current_modified_at,
            was_deleted: false,
        });
    }

    ensure_restorable(&tx, target)?;
    let modified_at = tx.query_row(
        &format!(
            "UPDATE {table}
             SET is_deleted = 0, modified_at = MAX(?2, modified_at + 1)
             WHERE id = ?1
             RETURNING modified_at;"
        ),
        rusqlite::params![id, now_epoch_ms()],
        |row| row.get::<_, i64>(0),
    )?;
    tx.commit()?;

    Ok(RestoreOutcome {
        target,
        modified_at,
        was_deleted: true,
    })
}

fn load_deleted_flag(conn: &Connection, target: EntityRef) -> LifecycleResult<bool> {
    let flag = conn
        .query_row(
            &format!("SELECT is_deleted FROM {} WHERE id = ?1;", target.kind.table()),
            [target.id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .ok_or_else(|| LifecycleError::not_found(target))?;
    match flag {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LifecycleError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {}.is_deleted",
            target.kind.table()
        ))),
    }
}

fn log_outcome<T>(
    event: &str,
    target: EntityRef,
    mode: &str,
    started_at: Instant,
    result: &LifecycleResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={event} module=lifecycle status=ok kind={} id={} mode={mode} duration_ms={duration_ms}",
            target.kind, target.id
        ),
        Err(err @ (LifecycleError::Protected(_) | LifecycleError::Validation(_))) => warn!(
            "event={event} module=lifecycle status=blocked kind={} id={} mode={mode} duration_ms={duration_ms} reason={}",
            target.kind,
            target.id,
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=lifecycle status=error kind={} id={} mode={mode} duration_ms={duration_ms} error_code={}",
            target.kind,
            target.id,
            err.code()
        ),
    }
}
