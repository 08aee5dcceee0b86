//! Trash bin use-cases: list, restore and purge soft-deleted entities.
//!
//! # Invariants
//! - Trash listings are sorted by `modified_at DESC, id ASC`; for a trashed
//!   row `modified_at` is its deletion time.
//! - `purge` only reaches trashed rows; an active row is `NotFound`.
//! - `can_purge` and `purge` agree: trashed dependents that hold a
//!   restricting foreign key are reported, and refused, as `Protected`.

use crate::lifecycle::engine::DeleteMode;
use crate::lifecycle::error::LifecycleResult;
use crate::lifecycle::scanner::DeletionCheck;
use crate::model::entity::{EntityId, EntityKind};
use crate::repo::entity_store::EntityStore;
use crate::repo::query::SortOrder;
use crate::repo::table::TableRow;

pub struct TrashService<'conn> {
    store: EntityStore<'conn>,
}

impl<'conn> TrashService<'conn> {
    pub fn new(store: EntityStore<'conn>) -> Self {
        Self { store }
    }

    /// Trashed entities of one kind, most recently deleted first.
    pub fn list_deleted<T: TableRow>(&self) -> LifecycleResult<Vec<T>> {
        self.store
            .deleted::<T>()
            .order_by("modified_at", SortOrder::Desc)?
            .list()
    }

    /// Restores one entity and returns its refreshed state.
    pub fn restore<T: TableRow>(&self, id: EntityId) -> LifecycleResult<T> {
        let mut entity = self.store.all::<T>().get(id)?;
        self.store.restore(&mut entity)?;
        Ok(entity)
    }

    /// What would keep one trashed entity from being purged.
    pub fn can_purge<T: TableRow>(&self, id: EntityId) -> LifecycleResult<DeletionCheck> {
        let entity = self.store.deleted::<T>().get(id)?;
        self.store.can_purge(&entity)
    }

    /// Permanently deletes one trashed entity.
    pub fn purge<T: TableRow>(&self, id: EntityId) -> LifecycleResult<()> {
        let mut entity = self.store.deleted::<T>().get(id)?;
        self.store.delete(&mut entity, DeleteMode::Hard)?;
        Ok(())
    }

    /// Trashed row count per kind, skipping kinds with an empty trash.
    pub fn summary(&self) -> LifecycleResult<Vec<(EntityKind, u64)>> {
        let mut summary = Vec::new();
        for kind in EntityKind::ALL {
            let (_, trashed) = self.store.counts(kind)?;
            if trashed > 0 {
                summary.push((kind, trashed));
            }
        }
        Ok(summary)
    }
}
