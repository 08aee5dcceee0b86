//! Medications and sanitary (health) events.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    /// Unique among active medications.
    pub name: String,
}

impl Medication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
        }
    }
}

impl Entity for Medication {
    const KIND: EntityKind = EntityKind::Medication;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("medication name", &self.name)
    }
}

/// Health procedure applied to a group of animals, e.g. a vaccination round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitaryEvent {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub title: String,
    pub medication_id: Option<EntityId>,
    pub performed_by: Option<EntityId>,
}

impl SanitaryEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: title.into(),
            medication_id: None,
            performed_by: None,
        }
    }
}

impl Entity for SanitaryEvent {
    const KIND: EntityKind = EntityKind::SanitaryEvent;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("event title", &self.title)
    }
}

/// Detail row linking one animal to a sanitary event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitaryEventTarget {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub event_id: EntityId,
    pub animal_id: EntityId,
}

impl SanitaryEventTarget {
    pub fn new(event_id: EntityId, animal_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            event_id,
            animal_id,
        }
    }
}

impl Entity for SanitaryEventTarget {
    const KIND: EntityKind = EntityKind::SanitaryEventTarget;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
