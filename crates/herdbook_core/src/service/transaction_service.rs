//! Sale and purchase use-cases.
//!
//! # Responsibility
//! - Create transactions for active partners.
//! - Attach line items that point at any sellable asset by kind and id.
//!
//! # Invariants
//! - Line items are only attached to active transactions and active assets.
//! - Each write runs in one write scope (an `IMMEDIATE` transaction, or a
//!   savepoint inside the caller's transaction), so an asset cannot be
//!   trashed between the check and the insert.
//! - Removing a line item soft-deletes it; the asset becomes deletable again.

use crate::lifecycle::engine::DeleteOutcome;
use crate::lifecycle::error::LifecycleResult;
use crate::lifecycle::write_scope::WriteScope;
use crate::model::commerce::{AssetRef, Partner, Transaction, TransactionItem, TransactionKind};
use crate::model::entity::{Entity, EntityId};
use crate::model::validation::ValidationError;
use crate::repo::entity_store::EntityStore;
use log::info;

pub struct TransactionService<'conn> {
    store: EntityStore<'conn>,
}

impl<'conn> TransactionService<'conn> {
    pub fn new(store: EntityStore<'conn>) -> Self {
        Self { store }
    }

    /// Records a new sale or purchase with `partner_id`.
    ///
    /// # Errors
    /// - `NotFound` when the partner is missing or trashed.
    pub fn create_transaction(
        &self,
        partner_id: EntityId,
        kind: TransactionKind,
        occurred_at: i64,
        notes: impl Into<String>,
    ) -> LifecycleResult<Transaction> {
        let tx = WriteScope::begin(self.store.connection())?;
        let store = EntityStore::unchecked(&tx, self.store.engine());

        store.active::<Partner>().get(partner_id)?;
        let mut transaction = Transaction::new(partner_id, kind, occurred_at);
        transaction.notes = notes.into();
        let transaction = store.create(transaction)?;
        tx.commit()?;

        info!(
            "event=transaction_create module=service status=ok id={} kind={}",
            transaction.id(),
            kind.as_str()
        );
        Ok(transaction)
    }

    /// Attaches `asset` to an active transaction.
    ///
    /// # Errors
    /// - `NotFound` when the transaction is missing or trashed.
    /// - `Validation` when the asset is not sellable, missing or trashed,
    ///   or quantity/price are invalid.
    pub fn add_item(
        &self,
        transaction_id: EntityId,
        asset: AssetRef,
        quantity: u32,
        unit_price_cents: i64,
    ) -> LifecycleResult<TransactionItem> {
        let tx = WriteScope::begin(self.store.connection())?;
        let store = EntityStore::unchecked(&tx, self.store.engine());

        store.active::<Transaction>().get(transaction_id)?;
        let item = TransactionItem::new(transaction_id, asset, quantity, unit_price_cents);
        item.validate()?;

        let available = tx
            .prepare_cached(&format!(
                "SELECT 1 FROM {} WHERE id = ?1 AND is_deleted = 0 LIMIT 1;",
                asset.kind.table()
            ))?
            .exists([asset.id.to_string()])?;
        if !available {
            return Err(ValidationError::new(
                "asset_unavailable",
                format!(
                    "Cannot add {} to the transaction because it does not exist or is in the trash.",
                    asset.kind.label()
                ),
            )
            .into());
        }

        let item = store.create(item)?;
        tx.commit()?;

        info!(
            "event=transaction_item_add module=service status=ok transaction_id={} asset_kind={}",
            transaction_id, asset.kind
        );
        Ok(item)
    }

    /// Active line items of one transaction.
    pub fn items(&self, transaction_id: EntityId) -> LifecycleResult<Vec<TransactionItem>> {
        self.store
            .active::<TransactionItem>()
            .filter_id("transaction_id", transaction_id)?
            .list()
    }

    /// Moves one active line item to the trash.
    pub fn remove_item(&self, item_id: EntityId) -> LifecycleResult<DeleteOutcome> {
        let mut item = self.store.active::<TransactionItem>().get(item_id)?;
        self.store.soft_delete(&mut item)
    }
}
