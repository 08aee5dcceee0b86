//! Weighing sessions and per-animal weight records.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Header for one day's weighing of a group of animals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeighingSession {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
    /// Audit-only pointer; it never blocks deleting the user.
    pub performed_by: Option<EntityId>,
}

impl WeighingSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            performed_by: None,
        }
    }
}

impl Entity for WeighingSession {
    const KIND: EntityKind = EntityKind::WeighingSession;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("session name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRecord {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub session_id: EntityId,
    pub animal_id: EntityId,
    pub weight_grams: u32,
}

impl WeightRecord {
    pub fn new(session_id: EntityId, animal_id: EntityId, weight_grams: u32) -> Self {
        Self {
            meta: EntityMeta::new(),
            session_id,
            animal_id,
            weight_grams,
        }
    }
}

impl Entity for WeightRecord {
    const KIND: EntityKind = EntityKind::WeightRecord;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.weight_grams == 0 {
            return Err(ValidationError::new(
                "invalid_weight",
                "weight must be greater than zero",
            ));
        }
        Ok(())
    }
}
