//! Reproduction records: seasons, breeding events, pregnancy checks and
//! calvings.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproductiveSeason {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
}

impl ReproductiveSeason {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
        }
    }
}

impl Entity for ReproductiveSeason {
    const KIND: EntityKind = EntityKind::ReproductiveSeason;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("season name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingEvent {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub dam_id: EntityId,
    /// Sire from the herd; `None` for external semen or an unknown bull.
    pub sire_id: Option<EntityId>,
    pub season_id: Option<EntityId>,
}

impl BreedingEvent {
    pub fn new(dam_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            dam_id,
            sire_id: None,
            season_id: None,
        }
    }

    pub fn in_season(mut self, season_id: EntityId) -> Self {
        self.season_id = Some(season_id);
        self
    }

    pub fn with_sire(mut self, sire_id: EntityId) -> Self {
        self.sire_id = Some(sire_id);
        self
    }
}

impl Entity for BreedingEvent {
    const KIND: EntityKind = EntityKind::BreedingEvent;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.sire_id == Some(self.dam_id) {
            return Err(ValidationError::new(
                "self_parentage",
                "A cattle cannot be bred with itself.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyResult {
    Positive,
    Negative,
}

impl PregnancyResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

/// Diagnosis following a breeding event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyCheck {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub breeding_event_id: EntityId,
    /// Unix epoch milliseconds.
    pub checked_at: i64,
    pub result: PregnancyResult,
    /// Estimated fetus age; only meaningful for a positive result.
    pub fetus_days: Option<u32>,
}

impl PregnancyCheck {
    pub fn new(breeding_event_id: EntityId, checked_at: i64, result: PregnancyResult) -> Self {
        Self {
            meta: EntityMeta::new(),
            breeding_event_id,
            checked_at,
            result,
            fetus_days: None,
        }
    }
}

impl Entity for PregnancyCheck {
    const KIND: EntityKind = EntityKind::PregnancyCheck;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.result == PregnancyResult::Negative && self.fetus_days.is_some() {
            return Err(ValidationError::new(
                "invalid_fetus_days",
                "A negative pregnancy check cannot record fetus days.",
            ));
        }
        Ok(())
    }
}

/// Birth record. `calf_id` is a one-to-one link: one calving per calf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calving {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub dam_id: EntityId,
    pub breeding_event_id: Option<EntityId>,
    pub calf_id: Option<EntityId>,
}

impl Calving {
    pub fn new(dam_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            dam_id,
            breeding_event_id: None,
            calf_id: None,
        }
    }
}

impl Entity for Calving {
    const KIND: EntityKind = EntityKind::Calving;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.calf_id == Some(self.dam_id) {
            return Err(ValidationError::new(
                "self_parentage",
                "A cattle cannot be recorded as its own calf.",
            ));
        }
        Ok(())
    }
}
