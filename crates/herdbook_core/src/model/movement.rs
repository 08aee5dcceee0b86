//! Batch movements of animals between locations.
//!
//! A movement owns its list of moved animals (`MovementAnimal`), which is a
//! composition child. The animals themselves are never protected by their
//! movement history: purging an animal drops its rows from that list.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    #[default]
    Rotation,
    Weaning,
    Medical,
    Sale,
    WeightCheck,
    Other,
}

impl MovementReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rotation => "rotation",
            Self::Weaning => "weaning",
            Self::Medical => "medical",
            Self::Sale => "sale",
            Self::WeightCheck => "weight_check",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rotation" => Some(Self::Rotation),
            "weaning" => Some(Self::Weaning),
            "medical" => Some(Self::Medical),
            "sale" => Some(Self::Sale),
            "weight_check" => Some(Self::WeightCheck),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Move of a batch of animals. `origin_id` is `None` for animals arriving
/// from outside the farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    /// Unix epoch milliseconds.
    pub moved_at: i64,
    pub origin_id: Option<EntityId>,
    pub destination_id: EntityId,
    pub reason: MovementReason,
    pub notes: String,
    pub performed_by: Option<EntityId>,
}

impl Movement {
    pub fn new(destination_id: EntityId, moved_at: i64) -> Self {
        Self {
            meta: EntityMeta::new(),
            moved_at,
            origin_id: None,
            destination_id,
            reason: MovementReason::default(),
            notes: String::new(),
            performed_by: None,
        }
    }

    pub fn from_location(mut self, origin_id: EntityId) -> Self {
        self.origin_id = Some(origin_id);
        self
    }
}

impl Entity for Movement {
    const KIND: EntityKind = EntityKind::Movement;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.origin_id == Some(self.destination_id) {
            return Err(ValidationError::new(
                "same_location",
                "Origin and destination must be different locations.",
            ));
        }
        Ok(())
    }
}

/// One animal moved by a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementAnimal {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub movement_id: EntityId,
    pub animal_id: EntityId,
}

impl MovementAnimal {
    pub fn new(movement_id: EntityId, animal_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            movement_id,
            animal_id,
        }
    }
}

impl Entity for MovementAnimal {
    const KIND: EntityKind = EntityKind::MovementAnimal;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::{Movement, MovementReason};
    use crate::model::entity::Entity;
    use uuid::Uuid;

    #[test]
    fn reasons_round_trip() {
        for reason in [
            MovementReason::Rotation,
            MovementReason::Weaning,
            MovementReason::Medical,
            MovementReason::Sale,
            MovementReason::WeightCheck,
            MovementReason::Other,
        ] {
            assert_eq!(MovementReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(MovementReason::parse("ROTATION"), None);
    }

    #[test]
    fn a_batch_cannot_move_onto_its_own_location() {
        let paddock = Uuid::new_v4();
        let movement = Movement::new(paddock, 0).from_location(paddock);
        assert_eq!(movement.validate().unwrap_err().code(), "same_location");
    }
}
