//! Animals and the places they are kept.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_ear_tag, require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Any physical space where animals are kept (pasture, corral, feedlot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
    /// Recommended head count. Zero means "not tracked".
    pub capacity_head: u32,
}

impl Location {
    pub fn new(name: impl Into<String>, capacity_head: u32) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            capacity_head,
        }
    }
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("location name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// One animal of the herd.
///
/// `tag` (the ear tag) is unique among active animals only, so the tag of a
/// trashed animal can be reissued immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cattle {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub tag: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub location_id: Option<EntityId>,
    pub sire_id: Option<EntityId>,
    pub dam_id: Option<EntityId>,
}

impl Cattle {
    pub fn new(tag: impl Into<String>, sex: Sex) -> Self {
        Self {
            meta: EntityMeta::new(),
            tag: tag.into(),
            name: None,
            sex,
            location_id: None,
            sire_id: None,
            dam_id: None,
        }
    }

    pub fn at_location(mut self, location_id: EntityId) -> Self {
        self.location_id = Some(location_id);
        self
    }
}

impl Entity for Cattle {
    const KIND: EntityKind = EntityKind::Cattle;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_ear_tag(&self.tag)?;
        let id = self.meta.id();
        if self.sire_id == Some(id) {
            return Err(ValidationError::new(
                "self_parentage",
                "A cattle cannot be its own sire.",
            ));
        }
        if self.dam_id == Some(id) {
            return Err(ValidationError::new(
                "self_parentage",
                "A cattle cannot be its own dam.",
            ));
        }
        Ok(())
    }
}
