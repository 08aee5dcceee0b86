//! Entity base shared by every persisted herdbook type.
//!
//! # Responsibility
//! - Define identity, timestamps and the soft-delete flag (`EntityMeta`).
//! - Name every persisted kind and its backing table (`EntityKind`).
//! - Expose soft-delete state through the `SoftDeletable` capability.
//!
//! # Invariants
//! - `id` is a non-nil UUID and never changes.
//! - `is_deleted` is the sole authority on visibility.
//! - Lifecycle flags and timestamps only change through the store, so
//!   mutators on `EntityMeta` are crate-private.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of any persisted entity.
pub type EntityId = Uuid;

/// Every persisted entity type, used as the type tag of polymorphic
/// associations and as the key of the relation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Partner,
    Location,
    Movement,
    MovementAnimal,
    Cattle,
    Transaction,
    TransactionItem,
    Medication,
    SanitaryEvent,
    SanitaryEventTarget,
    WeighingSession,
    WeightRecord,
    ReproductiveSeason,
    BreedingEvent,
    PregnancyCheck,
    Calving,
    FeedIngredient,
    Diet,
    DietItem,
    FeedingEvent,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 22] = [
        Self::User,
        Self::Partner,
        Self::Location,
        Self::Movement,
        Self::MovementAnimal,
        Self::Cattle,
        Self::Transaction,
        Self::TransactionItem,
        Self::Medication,
        Self::SanitaryEvent,
        Self::SanitaryEventTarget,
        Self::WeighingSession,
        Self::WeightRecord,
        Self::ReproductiveSeason,
        Self::BreedingEvent,
        Self::PregnancyCheck,
        Self::Calving,
        Self::FeedIngredient,
        Self::Diet,
        Self::DietItem,
        Self::FeedingEvent,
        Self::Task,
    ];

    /// Stable type tag, persisted in polymorphic `*_kind` columns.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Partner => "partner",
            Self::Location => "location",
            Self::Movement => "movement",
            Self::MovementAnimal => "movement_animal",
            Self::Cattle => "cattle",
            Self::Transaction => "transaction",
            Self::TransactionItem => "transaction_item",
            Self::Medication => "medication",
            Self::SanitaryEvent => "sanitary_event",
            Self::SanitaryEventTarget => "sanitary_event_target",
            Self::WeighingSession => "weighing_session",
            Self::WeightRecord => "weight_record",
            Self::ReproductiveSeason => "reproductive_season",
            Self::BreedingEvent => "breeding_event",
            Self::PregnancyCheck => "pregnancy_check",
            Self::Calving => "calving",
            Self::FeedIngredient => "feed_ingredient",
            Self::Diet => "diet",
            Self::DietItem => "diet_item",
            Self::FeedingEvent => "feeding_event",
            Self::Task => "task",
        }
    }

    /// Backing SQLite table.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Partner => "partners",
            Self::Location => "locations",
            Self::Movement => "movements",
            Self::MovementAnimal => "movement_animals",
            Self::Cattle => "cattle",
            Self::Transaction => "transactions",
            Self::TransactionItem => "transaction_items",
            Self::Medication => "medications",
            Self::SanitaryEvent => "sanitary_events",
            Self::SanitaryEventTarget => "sanitary_event_targets",
            Self::WeighingSession => "weighing_sessions",
            Self::WeightRecord => "weight_records",
            Self::ReproductiveSeason => "reproductive_seasons",
            Self::BreedingEvent => "breeding_events",
            Self::PregnancyCheck => "pregnancy_checks",
            Self::Calving => "calvings",
            Self::FeedIngredient => "feed_ingredients",
            Self::Diet => "diets",
            Self::DietItem => "diet_items",
            Self::FeedingEvent => "feeding_events",
            Self::Task => "tasks",
        }
    }

    /// Human-readable noun used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Partner => "partner",
            Self::Location => "location",
            Self::Movement => "movement",
            Self::MovementAnimal => "moved animal",
            Self::Cattle => "cattle",
            Self::Transaction => "transaction",
            Self::TransactionItem => "transaction item",
            Self::Medication => "medication",
            Self::SanitaryEvent => "sanitary event",
            Self::SanitaryEventTarget => "sanitary event target",
            Self::WeighingSession => "weighing session",
            Self::WeightRecord => "weight record",
            Self::ReproductiveSeason => "reproductive season",
            Self::BreedingEvent => "breeding event",
            Self::PregnancyCheck => "pregnancy check",
            Self::Calving => "calving",
            Self::FeedIngredient => "feed ingredient",
            Self::Diet => "diet",
            Self::DietItem => "diet item",
            Self::FeedingEvent => "feeding event",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Kinds that may appear as a sale or purchase line item.
    pub fn is_sellable(self) -> bool {
        matches!(self, Self::Cattle | Self::Medication | Self::FeedIngredient)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-erased pointer to one entity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Identity, timestamps and soft-delete flag embedded in every entity.
///
/// Timestamps are Unix epoch milliseconds and stay `0` until the entity is
/// first persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    id: EntityId,
    created_at: i64,
    modified_at: i64,
    is_deleted: bool,
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMeta {
    /// Fresh, not yet persisted metadata with a generated id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: 0,
            modified_at: 0,
            is_deleted: false,
        }
    }

    /// Metadata for a caller-provided id, used by import paths.
    pub fn with_id(id: EntityId) -> Result<Self, ValidationError> {
        if id.is_nil() {
            return Err(ValidationError::new("nil_id", "entity id must not be nil"));
        }
        Ok(Self { id, ..Self::new() })
    }

    pub(crate) fn from_parts(
        id: EntityId,
        created_at: i64,
        modified_at: i64,
        is_deleted: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            modified_at,
            is_deleted,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn modified_at(&self) -> i64 {
        self.modified_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub(crate) fn mark_created(&mut self, now: i64) {
        self.created_at = now;
        self.modified_at = now;
        self.is_deleted = false;
    }

    pub(crate) fn mark_modified(&mut self, modified_at: i64) {
        self.modified_at = modified_at;
    }

    pub(crate) fn mark_deleted(&mut self, modified_at: i64) {
        self.is_deleted = true;
        self.modified_at = modified_at;
    }

    pub(crate) fn mark_restored(&mut self, modified_at: i64) {
        self.is_deleted = false;
        self.modified_at = modified_at;
    }
}

/// Common contract of every persisted type.
pub trait Entity {
    const KIND: EntityKind;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Field-level invariants checked before every write.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn id(&self) -> EntityId {
        self.meta().id()
    }

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(Self::KIND, self.meta().id())
    }
}

/// Read-only view of soft-delete state.
pub trait SoftDeletable {
    fn is_deleted(&self) -> bool;

    fn is_active(&self) -> bool {
        !self.is_deleted()
    }

    /// Trash timestamp: the last write of a deleted entity.
    fn deleted_at(&self) -> Option<i64>;
}

impl<T: Entity> SoftDeletable for T {
    fn is_deleted(&self) -> bool {
        self.meta().is_deleted()
    }

    fn deleted_at(&self) -> Option<i64> {
        let meta = self.meta();
        meta.is_deleted().then_some(meta.modified_at())
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
