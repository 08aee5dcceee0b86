//! Partners, sale/purchase transactions and their line items.
//!
//! Line items point at the traded asset through an `AssetRef` (type tag plus
//! id) rather than a typed foreign key, so a single item table can carry
//! animals and supplies alike.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta, EntityRef};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Buyer or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub email: Option<String>,
}

impl Partner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            email: None,
        }
    }
}

impl Entity for Partner {
    const KIND: EntityKind = EntityKind::Partner;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("partner name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
        }
    }

    /// Capitalized name used in user-facing messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Purchase => "Purchase",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(Self::Sale),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }
}

/// Header of a sale or purchase. Line items are composition children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub partner_id: EntityId,
    pub kind: TransactionKind,
    /// Unix epoch milliseconds.
    pub occurred_at: i64,
    pub notes: String,
}

impl Transaction {
    pub fn new(partner_id: EntityId, kind: TransactionKind, occurred_at: i64) -> Self {
        Self {
            meta: EntityMeta::new(),
            partner_id,
            kind,
            occurred_at,
            notes: String::new(),
        }
    }
}

impl Entity for Transaction {
    const KIND: EntityKind = EntityKind::Transaction;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// Polymorphic pointer to any sellable asset.
pub type AssetRef = EntityRef;

/// One traded asset within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub transaction_id: EntityId,
    pub asset: AssetRef,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl TransactionItem {
    pub fn new(
        transaction_id: EntityId,
        asset: AssetRef,
        quantity: u32,
        unit_price_cents: i64,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            transaction_id,
            asset,
            quantity,
            unit_price_cents,
        }
    }
}

impl Entity for TransactionItem {
    const KIND: EntityKind = EntityKind::TransactionItem;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.asset.kind.is_sellable() {
            return Err(ValidationError::new(
                "asset_not_sellable",
                format!("a {} cannot be traded", self.asset.kind.label()),
            ));
        }
        if self.quantity == 0 {
            return Err(ValidationError::new(
                "invalid_quantity",
                "quantity must be greater than zero",
            ));
        }
        if self.unit_price_cents < 0 {
            return Err(ValidationError::new(
                "invalid_price",
                "unit price must not be negative",
            ));
        }
        Ok(())
    }
}
