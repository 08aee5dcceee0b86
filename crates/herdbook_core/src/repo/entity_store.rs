//! Entity store: the single entry point for entity persistence.
//!
//! # Responsibility
//! - Expose `active()`/`all()`/`deleted()` visibility queries.
//! - Create and update entities with validation and uniqueness checks.
//! - Route deletes and restores through the lifecycle engine.
//!
//! # Invariants
//! - Write paths call `Entity::validate()` before SQL mutations.
//! - Updates only reach active rows; a trashed entity must be restored
//!   first.
//! - `modified_at` strictly increases on every write.
//! - In-memory entity state is updated only after the database write
//!   succeeds.

use crate::db::migrations::{current_version, latest_version};
use crate::lifecycle::engine::{herdbook_engine, DeleteMode, DeleteOutcome, LifecycleEngine};
use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::scanner::DeletionCheck;
use crate::lifecycle::uniqueness::ensure_unique_values;
use crate::model::entity::{now_epoch_ms, Entity, EntityId, EntityKind, EntityRef};
use crate::repo::query::{Query, Visibility};
use crate::repo::table::TableRow;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

#[derive(Clone, Copy)]
pub struct EntityStore<'conn> {
    conn: &'conn Connection,
    engine: &'conn LifecycleEngine,
}

impl<'conn> EntityStore<'conn> {
    /// Creates a store over a migrated connection using the herdbook engine.
    pub fn try_new(conn: &'conn Connection) -> LifecycleResult<Self> {
        Self::with_engine(conn, herdbook_engine())
    }

    /// Creates a store with a caller-provided engine.
    pub fn with_engine(
        conn: &'conn Connection,
        engine: &'conn LifecycleEngine,
    ) -> LifecycleResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, engine })
    }

    pub(crate) fn unchecked(conn: &'conn Connection, engine: &'conn LifecycleEngine) -> Self {
        Self { conn, engine }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    pub fn engine(&self) -> &'conn LifecycleEngine {
        self.engine
    }

    /// Active rows only. The default for business code.
    pub fn active<T: TableRow>(&self) -> Query<'conn, T> {
        Query::new(self.conn, Visibility::Active)
    }

    /// Every row, trashed or not.
    pub fn all<T: TableRow>(&self) -> Query<'conn, T> {
        Query::new(self.conn, Visibility::All)
    }

    /// Trashed rows only.
    pub fn deleted<T: TableRow>(&self) -> Query<'conn, T> {
        Query::new(self.conn, Visibility::Deleted)
    }

    /// Inserts `entity` as a new active row and returns it with timestamps set.
    pub fn create<T: TableRow>(&self, mut entity: T) -> LifecycleResult<T> {
        entity.validate()?;
        let values = entity.to_values();
        ensure_unique_values(self.conn, entity.entity_ref(), T::COLUMNS, &values)?;

        let now = now_epoch_ms();
        let placeholders = (1..=T::COLUMNS.len() + 4)
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (id, created_at, modified_at, is_deleted, {}) VALUES ({placeholders});",
            T::KIND.table(),
            T::COLUMNS.join(", ")
        );

        let mut bind_values = vec![
            Value::Text(entity.id().to_string()),
            Value::Integer(now),
            Value::Integer(now),
            Value::Integer(0),
        ];
        bind_values.extend(values);
        self.conn.execute(&sql, params_from_iter(bind_values))?;

        entity.meta_mut().mark_created(now);
        debug!(
            "event=entity_create module=repo status=ok kind={} id={}",
            T::KIND,
            entity.id()
        );
        Ok(entity)
    }

    /// Persists domain fields of an active entity and bumps `modified_at`.
    ///
    /// # Errors
    /// - `NotFound` when the entity is missing or trashed.
    /// - `Validation` for field or uniqueness violations.
    pub fn update<T: TableRow>(&self, entity: &mut T) -> LifecycleResult<()> {
        entity.validate()?;
        let values = entity.to_values();
        ensure_unique_values(self.conn, entity.entity_ref(), T::COLUMNS, &values)?;

        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {}
             SET {assignments}, modified_at = MAX(?2, modified_at + 1)
             WHERE id = ?1 AND is_deleted = 0
             RETURNING modified_at;",
            T::KIND.table()
        );

        let mut bind_values = vec![
            Value::Text(entity.id().to_string()),
            Value::Integer(now_epoch_ms()),
        ];
        bind_values.extend(values);
        let modified_at = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get::<_, i64>(0))
            .optional()?
            .ok_or_else(|| LifecycleError::not_found(entity.entity_ref()))?;

        entity.meta_mut().mark_modified(modified_at);
        debug!(
            "event=entity_update module=repo status=ok kind={} id={}",
            T::KIND,
            entity.id()
        );
        Ok(())
    }

    /// Moves `entity` to the trash.
    pub fn soft_delete<T: TableRow>(&self, entity: &mut T) -> LifecycleResult<DeleteOutcome> {
        self.delete(entity, DeleteMode::Soft)
    }

    /// Deletes `entity` through the lifecycle engine.
    pub fn delete<T: TableRow>(
        &self,
        entity: &mut T,
        mode: DeleteMode,
    ) -> LifecycleResult<DeleteOutcome> {
        let outcome = self.engine.delete(self.conn, entity.entity_ref(), mode)?;
        if let Some(modified_at) = outcome.modified_at {
            entity.meta_mut().mark_deleted(modified_at);
        }
        Ok(outcome)
    }

    /// Restores a trashed `entity`; a no-op for an active one.
    pub fn restore<T: TableRow>(&self, entity: &mut T) -> LifecycleResult<()> {
        let outcome = self.engine.restore(self.conn, entity.entity_ref())?;
        entity.meta_mut().mark_restored(outcome.modified_at);
        Ok(())
    }

    /// Structural pre-flight check of a soft delete; read-only.
    pub fn can_delete<T: TableRow>(&self, entity: &T) -> LifecycleResult<DeletionCheck> {
        self.engine.can_delete(self.conn, T::KIND, entity.id())
    }

    /// Structural pre-flight check of a hard delete; read-only.
    pub fn can_purge<T: TableRow>(&self, entity: &T) -> LifecycleResult<DeletionCheck> {
        self.engine.can_purge(self.conn, T::KIND, entity.id())
    }

    /// Type-erased delete for callers that only hold a kind and id.
    pub fn delete_by_id(
        &self,
        kind: EntityKind,
        id: EntityId,
        mode: DeleteMode,
    ) -> LifecycleResult<DeleteOutcome> {
        self.engine.delete(self.conn, EntityRef::new(kind, id), mode)
    }

    /// Type-erased restore for callers that only hold a kind and id.
    pub fn restore_by_id(&self, kind: EntityKind, id: EntityId) -> LifecycleResult<()> {
        self.engine.restore(self.conn, EntityRef::new(kind, id))?;
        Ok(())
    }

    /// Active and trashed row counts of one kind.
    pub fn counts(&self, kind: EntityKind) -> LifecycleResult<(u64, u64)> {
        let (active, trashed): (i64, i64) = self.conn.query_row(
            &format!(
                "SELECT
                    COALESCE(SUM(CASE WHEN is_deleted = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN is_deleted = 1 THEN 1 ELSE 0 END), 0)
                 FROM {};",
                kind.table()
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let to_count = |value: i64| {
            u64::try_from(value)
                .map_err(|_| LifecycleError::InvalidData(format!("negative row count `{value}`")))
        };
        Ok((to_count(active)?, to_count(trashed)?))
    }
}

fn ensure_connection_ready(conn: &Connection) -> LifecycleResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(LifecycleError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
