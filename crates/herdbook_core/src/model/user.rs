//! Back-office user accounts.

use crate::model::entity::{Entity, EntityKind, EntityMeta};
use crate::model::validation::{require_username, ValidationError};
use serde::{Deserialize, Serialize};

/// Operator account. Authentication and permissions live outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    /// Unique among active users.
    pub username: String,
    /// At least one active superuser must always remain.
    pub is_superuser: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            username: username.into(),
            is_superuser: false,
        }
    }

    pub fn superuser(username: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::new(username)
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_username(&self.username)
    }
}
