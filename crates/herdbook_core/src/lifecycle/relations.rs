//! Static registry of typed relations, keyed by the kind they point at.
//!
//! # Responsibility
//! - Declare, once, every foreign-key style pointer between entity kinds.
//! - Answer "which relations target this kind?" for the protection scanner.
//!
//! # Invariants
//! - Descriptors are immutable after registry construction.
//! - `target_field` is a column of `source`'s table; it is interpolated into
//!   SQL, so only compile-time descriptors are accepted.
//! - A relation with `cascade_on_delete` or without an accessor never blocks
//!   deletion.
//! - `on_hard_delete` mirrors the `ON DELETE` action of the backing foreign
//!   key. `Restrict` relations must be navigable, so the scanner can name
//!   them before SQLite refuses the delete.

use crate::model::entity::EntityKind;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
    OneToOne,
}

/// What the storage does with referencing rows when the target row is
/// removed for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnHardDelete {
    /// Referencing rows are removed with the target.
    Cascade,
    /// The reference column is cleared.
    SetNull,
    /// Any referencing row, trashed or not, keeps the target alive.
    Restrict,
}

impl OnHardDelete {
    /// Action name as reported by `PRAGMA foreign_key_list`.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }
}

/// One relation `source.target_field -> target.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub source: EntityKind,
    pub target: EntityKind,
    pub target_field: &'static str,
    pub cardinality: Cardinality,
    /// Composition: dependents are destroyed with the target.
    pub cascade_on_delete: bool,
    /// Reverse accessor name on the target. `None` means the relation is
    /// not navigable from the target and is skipped by the scanner.
    pub accessor: Option<&'static str>,
    pub on_hard_delete: OnHardDelete,
}

impl RelationDescriptor {
    /// Blocking one-to-many reference whose rows keep the target alive.
    pub const fn reference(
        source: EntityKind,
        target_field: &'static str,
        target: EntityKind,
        accessor: &'static str,
    ) -> Self {
        Self {
            source,
            target,
            target_field,
            cardinality: Cardinality::OneToMany,
            cascade_on_delete: false,
            accessor: Some(accessor),
            on_hard_delete: OnHardDelete::Restrict,
        }
    }

    /// Blocking one-to-one back reference.
    pub const fn one_to_one(
        source: EntityKind,
        target_field: &'static str,
        target: EntityKind,
        accessor: &'static str,
    ) -> Self {
        Self {
            cardinality: Cardinality::OneToOne,
            ..Self::reference(source, target_field, target, accessor)
        }
    }

    /// Composition child destroyed with its parent.
    pub const fn composition(
        source: EntityKind,
        target_field: &'static str,
        target: EntityKind,
        accessor: &'static str,
    ) -> Self {
        Self {
            cascade_on_delete: true,
            on_hard_delete: OnHardDelete::Cascade,
            ..Self::reference(source, target_field, target, accessor)
        }
    }

    /// Pointer with no reverse accessor; never scanned.
    pub const fn unreachable(
        source: EntityKind,
        target_field: &'static str,
        target: EntityKind,
        on_hard_delete: OnHardDelete,
    ) -> Self {
        Self {
            source,
            target,
            target_field,
            cardinality: Cardinality::OneToMany,
            cascade_on_delete: false,
            accessor: None,
            on_hard_delete,
        }
    }

    /// Same relation with a different storage action on hard delete.
    pub const fn on_hard_delete(self, on_hard_delete: OnHardDelete) -> Self {
        Self {
            on_hard_delete,
            ..self
        }
    }

    /// Whether active dependents through this relation block deletion.
    pub fn is_blocking(&self) -> bool {
        self.accessor.is_some() && !self.cascade_on_delete
    }

    /// Whether trashed dependents also block a hard delete.
    pub fn blocks_purge_when_trashed(&self) -> bool {
        self.is_blocking() && self.on_hard_delete == OnHardDelete::Restrict
    }
}

/// Relations of the herdbook schema.
pub const HERDBOOK_RELATIONS: &[RelationDescriptor] = &[
    RelationDescriptor::reference(EntityKind::Cattle, "location_id", EntityKind::Location, "cattle")
        .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::Movement,
        "destination_id",
        EntityKind::Location,
        "movements_in",
    ),
    RelationDescriptor::reference(
        EntityKind::Movement,
        "origin_id",
        EntityKind::Location,
        "movements_out",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::FeedingEvent,
        "location_id",
        EntityKind::Location,
        "feeding_events",
    ),
    RelationDescriptor::composition(
        EntityKind::MovementAnimal,
        "movement_id",
        EntityKind::Movement,
        "animals",
    ),
    RelationDescriptor::reference(
        EntityKind::Cattle,
        "sire_id",
        EntityKind::Cattle,
        "offspring_sire",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(EntityKind::Cattle, "dam_id", EntityKind::Cattle, "offspring_dam")
        .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::SanitaryEventTarget,
        "animal_id",
        EntityKind::Cattle,
        "health_records",
    )
    .on_hard_delete(OnHardDelete::Cascade),
    RelationDescriptor::reference(
        EntityKind::WeightRecord,
        "animal_id",
        EntityKind::Cattle,
        "weight_records",
    )
    .on_hard_delete(OnHardDelete::Cascade),
    RelationDescriptor::reference(
        EntityKind::BreedingEvent,
        "dam_id",
        EntityKind::Cattle,
        "breeding_events_as_dam",
    )
    .on_hard_delete(OnHardDelete::Cascade),
    RelationDescriptor::reference(
        EntityKind::BreedingEvent,
        "sire_id",
        EntityKind::Cattle,
        "breeding_events_as_sire",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(EntityKind::Calving, "dam_id", EntityKind::Cattle, "calvings")
        .on_hard_delete(OnHardDelete::Cascade),
    RelationDescriptor::one_to_one(
        EntityKind::Calving,
        "calf_id",
        EntityKind::Cattle,
        "birth_event",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::unreachable(
        EntityKind::MovementAnimal,
        "animal_id",
        EntityKind::Cattle,
        OnHardDelete::Cascade,
    ),
    RelationDescriptor::reference(
        EntityKind::Transaction,
        "partner_id",
        EntityKind::Partner,
        "transactions",
    ),
    RelationDescriptor::composition(
        EntityKind::TransactionItem,
        "transaction_id",
        EntityKind::Transaction,
        "items",
    ),
    RelationDescriptor::reference(
        EntityKind::SanitaryEvent,
        "medication_id",
        EntityKind::Medication,
        "events",
    ),
    RelationDescriptor::composition(
        EntityKind::SanitaryEventTarget,
        "event_id",
        EntityKind::SanitaryEvent,
        "targets",
    ),
    RelationDescriptor::composition(
        EntityKind::WeightRecord,
        "session_id",
        EntityKind::WeighingSession,
        "records",
    ),
    RelationDescriptor::reference(
        EntityKind::BreedingEvent,
        "season_id",
        EntityKind::ReproductiveSeason,
        "breeding_events",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::PregnancyCheck,
        "breeding_event_id",
        EntityKind::BreedingEvent,
        "pregnancy_checks",
    )
    .on_hard_delete(OnHardDelete::Cascade),
    RelationDescriptor::reference(
        EntityKind::Calving,
        "breeding_event_id",
        EntityKind::BreedingEvent,
        "calving_outcome",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::DietItem,
        "ingredient_id",
        EntityKind::FeedIngredient,
        "diet_items",
    ),
    RelationDescriptor::composition(EntityKind::DietItem, "diet_id", EntityKind::Diet, "items"),
    RelationDescriptor::reference(
        EntityKind::FeedingEvent,
        "diet_id",
        EntityKind::Diet,
        "feeding_events",
    ),
    RelationDescriptor::reference(
        EntityKind::SanitaryEvent,
        "performed_by",
        EntityKind::User,
        "sanitary_events",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::unreachable(
        EntityKind::WeighingSession,
        "performed_by",
        EntityKind::User,
        OnHardDelete::SetNull,
    ),
    RelationDescriptor::reference(
        EntityKind::FeedingEvent,
        "performed_by",
        EntityKind::User,
        "feeding_events",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(
        EntityKind::Movement,
        "performed_by",
        EntityKind::User,
        "movements_performed",
    )
    .on_hard_delete(OnHardDelete::SetNull),
    RelationDescriptor::reference(EntityKind::Task, "assigned_to", EntityKind::User, "tasks")
        .on_hard_delete(OnHardDelete::SetNull),
];

static HERDBOOK_REGISTRY: Lazy<Arc<RelationRegistry>> =
    Lazy::new(|| Arc::new(RelationRegistry::new(HERDBOOK_RELATIONS)));

/// Shared registry built from [`HERDBOOK_RELATIONS`] on first use.
pub fn herdbook_relations() -> Arc<RelationRegistry> {
    Arc::clone(&HERDBOOK_REGISTRY)
}

/// Relations grouped by target kind, preserving declaration order.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    by_target: BTreeMap<EntityKind, Vec<RelationDescriptor>>,
}

impl RelationRegistry {
    pub fn new(descriptors: &[RelationDescriptor]) -> Self {
        let mut by_target: BTreeMap<EntityKind, Vec<RelationDescriptor>> = BTreeMap::new();
        for descriptor in descriptors {
            by_target
                .entry(descriptor.target)
                .or_default()
                .push(*descriptor);
        }
        Self { by_target }
    }

    /// All relations whose target is `kind`, blocking or not.
    pub fn targeting(&self, kind: EntityKind) -> &[RelationDescriptor] {
        self.by_target
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}
