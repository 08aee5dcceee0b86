//! Guard for `(type tag, id)` associations that no foreign key can express.
//!
//! # Responsibility
//! - Let holder types register a lookup for references they store.
//! - Refuse deletes of entities an active holder row still points at.
//!
//! # Invariants
//! - Holders are asked in registration order; the first hit wins.
//! - Only active holder rows count.
//! - Holder ids are unique within one guard.

use crate::lifecycle::error::{LifecycleResult, RegistrationError};
use crate::lifecycle::view::ReadView;
use crate::model::commerce::TransactionKind;
use crate::model::entity::EntityRef;
use crate::model::validation::ValidationError;
use std::sync::Arc;

/// A type that stores polymorphic references to other entities.
pub trait PolymorphicHolder: Send + Sync {
    fn holder_id(&self) -> &'static str;

    /// Whether an active holder row references `target`.
    fn reference_exists(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<bool>;

    /// User-facing refusal text for `target`.
    fn blocked_message(&self, target: EntityRef) -> String;
}

#[derive(Default, Clone)]
pub struct PolymorphicGuard {
    holders: Vec<Arc<dyn PolymorphicHolder>>,
}

impl PolymorphicGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard with sale and purchase line items registered.
    pub fn herdbook() -> Self {
        let holders: Vec<Arc<dyn PolymorphicHolder>> = vec![
            Arc::new(TransactionLineItems::new(TransactionKind::Sale)),
            Arc::new(TransactionLineItems::new(TransactionKind::Purchase)),
        ];
        Self { holders }
    }

    pub fn register(
        &mut self,
        holder: Arc<dyn PolymorphicHolder>,
    ) -> Result<(), RegistrationError> {
        let holder_id = holder.holder_id();
        if self
            .holders
            .iter()
            .any(|existing| existing.holder_id() == holder_id)
        {
            return Err(RegistrationError::DuplicateHolder(holder_id.to_string()));
        }
        self.holders.push(holder);
        Ok(())
    }

    pub fn holder_ids(&self) -> Vec<&'static str> {
        self.holders.iter().map(|holder| holder.holder_id()).collect()
    }

    /// Fails with the first matching holder's message.
    pub fn check_polymorphic_references(
        &self,
        target: EntityRef,
        view: &ReadView<'_>,
    ) -> LifecycleResult<()> {
        for holder in &self.holders {
            if holder.reference_exists(target, view)? {
                return Err(ValidationError::new(
                    "polymorphic_reference",
                    holder.blocked_message(target),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Line items of one transaction kind, stored in `transaction_items`.
pub struct TransactionLineItems {
    kind: TransactionKind,
}

impl TransactionLineItems {
    pub fn new(kind: TransactionKind) -> Self {
        Self { kind }
    }
}

impl PolymorphicHolder for TransactionLineItems {
    fn holder_id(&self) -> &'static str {
        match self.kind {
            TransactionKind::Sale => "sale_line_items",
            TransactionKind::Purchase => "purchase_line_items",
        }
    }

    fn reference_exists(&self, target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<bool> {
        view.exists(
            "SELECT 1
             FROM transaction_items item
             JOIN transactions tx ON tx.id = item.transaction_id
             WHERE item.asset_kind = ?1
               AND item.asset_id = ?2
               AND item.is_deleted = 0
               AND tx.kind = ?3
             LIMIT 1;",
            [
                target.kind.as_str().to_string(),
                target.id.to_string(),
                self.kind.as_str().to_string(),
            ],
        )
    }

    fn blocked_message(&self, target: EntityRef) -> String {
        format!(
            "Cannot delete {} because it is part of a {} transaction. Please delete the transaction item first.",
            target.kind.label(),
            self.kind.display_name()
        )
    }
}
