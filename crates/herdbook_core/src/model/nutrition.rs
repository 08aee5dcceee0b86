//! Feed stock, diets and feeding events.
//!
//! # Invariants
//! - Quantities are integer grams and prices integer cents; nothing here
//!   uses floating point.
//! - A diet's items are composition children and go with the diet.
//! - Ingredients, diets and locations stay referenced by feeding history,
//!   so they cannot be purged while that history exists.

use crate::model::entity::{Entity, EntityId, EntityKind, EntityMeta};
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Whole basis points in 100 percent.
pub const FULL_PROPORTION_BASIS_POINTS: u32 = 10_000;

/// Stocked feed component (corn, soybean meal, mineral salt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedIngredient {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub stock_grams: i64,
    /// Cost of one kilogram.
    pub unit_cost_cents: i64,
    /// Stock level at or below which the ingredient is reported as low.
    pub min_stock_grams: i64,
}

impl FeedIngredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            stock_grams: 0,
            unit_cost_cents: 0,
            min_stock_grams: 0,
        }
    }

    pub fn is_low_on_stock(&self) -> bool {
        self.min_stock_grams > 0 && self.stock_grams <= self.min_stock_grams
    }
}

impl Entity for FeedIngredient {
    const KIND: EntityKind = EntityKind::FeedIngredient;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("ingredient name", &self.name)?;
        if self.stock_grams < 0 || self.min_stock_grams < 0 {
            return Err(ValidationError::new(
                "invalid_stock",
                "stock quantities must not be negative",
            ));
        }
        if self.unit_cost_cents < 0 {
            return Err(ValidationError::new(
                "invalid_price",
                "unit cost must not be negative",
            ));
        }
        Ok(())
    }
}

/// Named feed formula made of weighted ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diet {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub description: Option<String>,
}

impl Diet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            description: None,
        }
    }
}

impl Entity for Diet {
    const KIND: EntityKind = EntityKind::Diet;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("diet name", &self.name)
    }
}

/// Share of one ingredient in a diet, in basis points (1/100 of a percent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietItem {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub diet_id: EntityId,
    pub ingredient_id: EntityId,
    pub proportion_basis_points: u32,
}

impl DietItem {
    pub fn new(diet_id: EntityId, ingredient_id: EntityId, proportion_basis_points: u32) -> Self {
        Self {
            meta: EntityMeta::new(),
            diet_id,
            ingredient_id,
            proportion_basis_points,
        }
    }
}

impl Entity for DietItem {
    const KIND: EntityKind = EntityKind::DietItem;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.proportion_basis_points == 0
            || self.proportion_basis_points > FULL_PROPORTION_BASIS_POINTS
        {
            return Err(ValidationError::new(
                "invalid_proportion",
                "ingredient proportion must be between 0.01% and 100%",
            ));
        }
        Ok(())
    }
}

/// One delivery of a diet to the animals kept at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingEvent {
    #[serde(flatten)]
    pub(crate) meta: EntityMeta,
    pub location_id: EntityId,
    pub diet_id: EntityId,
    /// Unix epoch milliseconds.
    pub fed_at: i64,
    pub amount_grams: u32,
    pub cost_cents: i64,
    pub performed_by: Option<EntityId>,
}

impl FeedingEvent {
    pub fn new(location_id: EntityId, diet_id: EntityId, fed_at: i64, amount_grams: u32) -> Self {
        Self {
            meta: EntityMeta::new(),
            location_id,
            diet_id,
            fed_at,
            amount_grams,
            cost_cents: 0,
            performed_by: None,
        }
    }
}

impl Entity for FeedingEvent {
    const KIND: EntityKind = EntityKind::FeedingEvent;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.amount_grams == 0 {
            return Err(ValidationError::new(
                "invalid_amount",
                "feeding amount must be greater than zero",
            ));
        }
        if self.cost_cents < 0 {
            return Err(ValidationError::new(
                "invalid_price",
                "feeding cost must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DietItem, FeedIngredient, FULL_PROPORTION_BASIS_POINTS};
    use crate::model::entity::Entity;
    use uuid::Uuid;

    #[test]
    fn proportions_are_bounded_by_one_hundred_percent() {
        let (diet, ingredient) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(DietItem::new(diet, ingredient, FULL_PROPORTION_BASIS_POINTS)
            .validate()
            .is_ok());
        for invalid in [0, FULL_PROPORTION_BASIS_POINTS + 1] {
            let err = DietItem::new(diet, ingredient, invalid)
                .validate()
                .unwrap_err();
            assert_eq!(err.code(), "invalid_proportion");
        }
    }

    #[test]
    fn low_stock_requires_a_threshold() {
        let mut corn = FeedIngredient::new("Corn");
        assert!(!corn.is_low_on_stock());
        corn.min_stock_grams = 50_000;
        corn.stock_grams = 50_000;
        assert!(corn.is_low_on_stock());
        corn.stock_grams = -1;
        assert_eq!(corn.validate().unwrap_err().code(), "invalid_stock");
    }
}
