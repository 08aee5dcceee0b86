//! Per-kind pre-delete predicates.
//!
//! # Responsibility
//! - Hold business rules that the relation registry cannot express.
//! - Run before the protection scanner, with read-only access only.
//!
//! # Invariants
//! - Hooks see the entity reference and a `ReadView`, never the entity
//!   value or a writable connection.
//! - Hook names are unique within one registry.

use crate::lifecycle::error::{LifecycleResult, RegistrationError};
use crate::lifecycle::view::ReadView;
use crate::model::entity::{EntityKind, EntityRef};
use crate::model::validation::ValidationError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pre-delete predicate registered for one entity kind.
pub trait DeleteHook: Send + Sync {
    /// Stable identifier, used for duplicate detection and logs.
    fn name(&self) -> &'static str;

    fn kind(&self) -> EntityKind;

    /// Returns `Err(LifecycleError::Validation(..))` to refuse the delete.
    fn before_delete(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<()>;
}

/// Hooks grouped by kind, run in registration order.
#[derive(Default, Clone)]
pub struct HookRegistry {
    by_kind: BTreeMap<EntityKind, Vec<Arc<dyn DeleteHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the herdbook business rules.
    pub fn herdbook() -> Self {
        let mut registry = Self::new();
        registry.by_kind.insert(
            EntityKind::User,
            vec![Arc::new(LastSuperuserHook) as Arc<dyn DeleteHook>],
        );
        registry.by_kind.insert(
            EntityKind::Medication,
            vec![Arc::new(MedicationUsageHook) as Arc<dyn DeleteHook>],
        );
        registry
    }

    pub fn register(&mut self, hook: Arc<dyn DeleteHook>) -> Result<(), RegistrationError> {
        let name = hook.name();
        if self
            .by_kind
            .values()
            .flatten()
            .any(|existing| existing.name() == name)
        {
            return Err(RegistrationError::DuplicateHook(name.to_string()));
        }
        self.by_kind.entry(hook.kind()).or_default().push(hook);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every hook of `target.kind`, stopping at the first refusal.
    pub fn run(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<()> {
        let Some(hooks) = self.by_kind.get(&target.kind) else {
            return Ok(());
        };
        for hook in hooks {
            hook.before_delete(target, view)?;
        }
        Ok(())
    }
}

/// Keeps at least one active superuser in the system.
///
/// Applies to soft and hard deletes. Hard-deleting a trashed superuser is
/// also refused while no other superuser is active.
pub struct LastSuperuserHook;

impl DeleteHook for LastSuperuserHook {
    fn name(&self) -> &'static str {
        "last_superuser"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn before_delete(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<()> {
        let id = target.id.to_string();
        let is_superuser = view
            .query_i64("SELECT is_superuser FROM users WHERE id = ?1;", [id.as_str()])?
            .unwrap_or(0);
        if is_superuser != 1 {
            return Ok(());
        }

        let other_active = view.exists(
            "SELECT 1 FROM users
             WHERE is_superuser = 1 AND is_deleted = 0 AND id <> ?1
             LIMIT 1;",
            [id.as_str()],
        )?;
        if !other_active {
            return Err(ValidationError::new(
                "last_superuser",
                "Cannot delete the last active superuser.",
            )
            .into());
        }
        Ok(())
    }
}

/// Keeps medications that appear in any sanitary event, trashed or not.
pub struct MedicationUsageHook;

impl DeleteHook for MedicationUsageHook {
    fn name(&self) -> &'static str {
        "medication_usage"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Medication
    }

    fn before_delete(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<()> {
        let used = view.exists(
            "SELECT 1 FROM sanitary_events WHERE medication_id = ?1 LIMIT 1;",
            [target.id.to_string()],
        )?;
        if used {
            return Err(ValidationError::new(
                "medication_in_use",
                "Cannot delete this medication because it has been used in sanitary events (active or archived).",
            )
            .into());
        }
        Ok(())
    }
}
