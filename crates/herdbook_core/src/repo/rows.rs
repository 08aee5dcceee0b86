//! `TableRow` mappings for every herdbook entity.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::model::breeding::{
    BreedingEvent, Calving, PregnancyCheck, PregnancyResult, ReproductiveSeason,
};
use crate::model::commerce::{AssetRef, Partner, Transaction, TransactionItem, TransactionKind};
use crate::model::entity::{EntityKind, EntityMeta};
use crate::model::health::{Medication, SanitaryEvent, SanitaryEventTarget};
use crate::model::herd::{Cattle, Location, Sex};
use crate::model::movement::{Movement, MovementAnimal, MovementReason};
use crate::model::nutrition::{Diet, DietItem, FeedIngredient, FeedingEvent};
use crate::model::task::{Task, TaskPriority, TaskStatus};
use crate::model::user::User;
use crate::model::weight::{WeighingSession, WeightRecord};
use crate::repo::table::{
    flag_column, flag_value, id_value, optional_id_value, optional_integer, optional_text,
    optional_u32_column, optional_uuid_column, tag_column, text, u32_column, uuid_column,
    TableRow,
};
use rusqlite::types::Value;
use rusqlite::Row;

impl TableRow for User {
    const COLUMNS: &'static [&'static str] = &["username", "is_superuser"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.username), flag_value(self.is_superuser)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            username: row.get("username")?,
            is_superuser: flag_column::<Self>(row, "is_superuser")?,
        })
    }
}

impl TableRow for Partner {
    const COLUMNS: &'static [&'static str] = &["name", "email"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name), optional_text(self.email.as_deref())]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            email: row.get("email")?,
        })
    }
}

impl TableRow for Location {
    const COLUMNS: &'static [&'static str] = &["name", "capacity_head"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(i64::from(self.capacity_head)),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            capacity_head: u32_column::<Self>(row, "capacity_head")?,
        })
    }
}

impl TableRow for Cattle {
    const COLUMNS: &'static [&'static str] =
        &["tag", "name", "sex", "location_id", "sire_id", "dam_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.tag),
            optional_text(self.name.as_deref()),
            text(self.sex.as_str()),
            optional_id_value(self.location_id),
            optional_id_value(self.sire_id),
            optional_id_value(self.dam_id),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        let sex_text: String = row.get("sex")?;
        let sex = Sex::parse(&sex_text).ok_or_else(|| {
            LifecycleError::InvalidData(format!("invalid sex `{sex_text}` in cattle.sex"))
        })?;
        Ok(Self {
            meta,
            tag: row.get("tag")?,
            name: row.get("name")?,
            sex,
            location_id: optional_uuid_column::<Self>(row, "location_id")?,
            sire_id: optional_uuid_column::<Self>(row, "sire_id")?,
            dam_id: optional_uuid_column::<Self>(row, "dam_id")?,
        })
    }
}

impl TableRow for Transaction {
    const COLUMNS: &'static [&'static str] = &["partner_id", "kind", "occurred_at", "notes"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.partner_id),
            text(self.kind.as_str()),
            Value::Integer(self.occurred_at),
            text(&self.notes),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        let kind_text: String = row.get("kind")?;
        let kind = TransactionKind::parse(&kind_text).ok_or_else(|| {
            LifecycleError::InvalidData(format!(
                "invalid transaction kind `{kind_text}` in transactions.kind"
            ))
        })?;
        Ok(Self {
            meta,
            partner_id: uuid_column::<Self>(row, "partner_id")?,
            kind,
            occurred_at: row.get("occurred_at")?,
            notes: row.get("notes")?,
        })
    }
}

impl TableRow for TransactionItem {
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "asset_kind",
        "asset_id",
        "quantity",
        "unit_price_cents",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.transaction_id),
            text(self.asset.kind.as_str()),
            id_value(self.asset.id),
            Value::Integer(i64::from(self.quantity)),
            Value::Integer(self.unit_price_cents),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        let kind_text: String = row.get("asset_kind")?;
        let asset_kind = EntityKind::parse(&kind_text).ok_or_else(|| {
            LifecycleError::InvalidData(format!(
                "invalid asset kind `{kind_text}` in transaction_items.asset_kind"
            ))
        })?;
        Ok(Self {
            meta,
            transaction_id: uuid_column::<Self>(row, "transaction_id")?,
            asset: AssetRef::new(asset_kind, uuid_column::<Self>(row, "asset_id")?),
            quantity: u32_column::<Self>(row, "quantity")?,
            unit_price_cents: row.get("unit_price_cents")?,
        })
    }
}

impl TableRow for Medication {
    const COLUMNS: &'static [&'static str] = &["name"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
        })
    }
}

impl TableRow for SanitaryEvent {
    const COLUMNS: &'static [&'static str] = &["title", "medication_id", "performed_by"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            optional_id_value(self.medication_id),
            optional_id_value(self.performed_by),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            title: row.get("title")?,
            medication_id: optional_uuid_column::<Self>(row, "medication_id")?,
            performed_by: optional_uuid_column::<Self>(row, "performed_by")?,
        })
    }
}

impl TableRow for SanitaryEventTarget {
    const COLUMNS: &'static [&'static str] = &["event_id", "animal_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![id_value(self.event_id), id_value(self.animal_id)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            event_id: uuid_column::<Self>(row, "event_id")?,
            animal_id: uuid_column::<Self>(row, "animal_id")?,
        })
    }
}

impl TableRow for WeighingSession {
    const COLUMNS: &'static [&'static str] = &["name", "performed_by"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name), optional_id_value(self.performed_by)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            performed_by: optional_uuid_column::<Self>(row, "performed_by")?,
        })
    }
}

impl TableRow for WeightRecord {
    const COLUMNS: &'static [&'static str] = &["session_id", "animal_id", "weight_grams"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.session_id),
            id_value(self.animal_id),
            Value::Integer(i64::from(self.weight_grams)),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            session_id: uuid_column::<Self>(row, "session_id")?,
            animal_id: uuid_column::<Self>(row, "animal_id")?,
            weight_grams: u32_column::<Self>(row, "weight_grams")?,
        })
    }
}

impl TableRow for ReproductiveSeason {
    const COLUMNS: &'static [&'static str] = &["name"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
        })
    }
}

impl TableRow for BreedingEvent {
    const COLUMNS: &'static [&'static str] = &["dam_id", "sire_id", "season_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.dam_id),
            optional_id_value(self.sire_id),
            optional_id_value(self.season_id),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            dam_id: uuid_column::<Self>(row, "dam_id")?,
            sire_id: optional_uuid_column::<Self>(row, "sire_id")?,
            season_id: optional_uuid_column::<Self>(row, "season_id")?,
        })
    }
}

impl TableRow for PregnancyCheck {
    const COLUMNS: &'static [&'static str] =
        &["breeding_event_id", "checked_at", "result", "fetus_days"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.breeding_event_id),
            Value::Integer(self.checked_at),
            text(self.result.as_str()),
            optional_integer(self.fetus_days.map(i64::from)),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            breeding_event_id: uuid_column::<Self>(row, "breeding_event_id")?,
            checked_at: row.get("checked_at")?,
            result: tag_column::<Self, _>(row, "result", PregnancyResult::parse)?,
            fetus_days: optional_u32_column::<Self>(row, "fetus_days")?,
        })
    }
}

impl TableRow for Calving {
    const COLUMNS: &'static [&'static str] = &["dam_id", "breeding_event_id", "calf_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.dam_id),
            optional_id_value(self.breeding_event_id),
            optional_id_value(self.calf_id),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            dam_id: uuid_column::<Self>(row, "dam_id")?,
            breeding_event_id: optional_uuid_column::<Self>(row, "breeding_event_id")?,
            calf_id: optional_uuid_column::<Self>(row, "calf_id")?,
        })
    }
}

impl TableRow for Movement {
    const COLUMNS: &'static [&'static str] = &[
        "moved_at",
        "origin_id",
        "destination_id",
        "reason",
        "notes",
        "performed_by",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.moved_at),
            optional_id_value(self.origin_id),
            id_value(self.destination_id),
            text(self.reason.as_str()),
            text(&self.notes),
            optional_id_value(self.performed_by),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            moved_at: row.get("moved_at")?,
            origin_id: optional_uuid_column::<Self>(row, "origin_id")?,
            destination_id: uuid_column::<Self>(row, "destination_id")?,
            reason: tag_column::<Self, _>(row, "reason", MovementReason::parse)?,
            notes: row.get("notes")?,
            performed_by: optional_uuid_column::<Self>(row, "performed_by")?,
        })
    }
}

impl TableRow for MovementAnimal {
    const COLUMNS: &'static [&'static str] = &["movement_id", "animal_id"];

    fn to_values(&self) -> Vec<Value> {
        vec![id_value(self.movement_id), id_value(self.animal_id)]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            movement_id: uuid_column::<Self>(row, "movement_id")?,
            animal_id: uuid_column::<Self>(row, "animal_id")?,
        })
    }
}

impl TableRow for FeedIngredient {
    const COLUMNS: &'static [&'static str] =
        &["name", "stock_grams", "unit_cost_cents", "min_stock_grams"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.stock_grams),
            Value::Integer(self.unit_cost_cents),
            Value::Integer(self.min_stock_grams),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            stock_grams: row.get("stock_grams")?,
            unit_cost_cents: row.get("unit_cost_cents")?,
            min_stock_grams: row.get("min_stock_grams")?,
        })
    }
}

impl TableRow for Diet {
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.name), optional_text(self.description.as_deref())]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    }
}

impl TableRow for DietItem {
    const COLUMNS: &'static [&'static str] =
        &["diet_id", "ingredient_id", "proportion_basis_points"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.diet_id),
            id_value(self.ingredient_id),
            Value::Integer(i64::from(self.proportion_basis_points)),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            diet_id: uuid_column::<Self>(row, "diet_id")?,
            ingredient_id: uuid_column::<Self>(row, "ingredient_id")?,
            proportion_basis_points: u32_column::<Self>(row, "proportion_basis_points")?,
        })
    }
}

impl TableRow for FeedingEvent {
    const COLUMNS: &'static [&'static str] = &[
        "location_id",
        "diet_id",
        "fed_at",
        "amount_grams",
        "cost_cents",
        "performed_by",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            id_value(self.location_id),
            id_value(self.diet_id),
            Value::Integer(self.fed_at),
            Value::Integer(i64::from(self.amount_grams)),
            Value::Integer(self.cost_cents),
            optional_id_value(self.performed_by),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            location_id: uuid_column::<Self>(row, "location_id")?,
            diet_id: uuid_column::<Self>(row, "diet_id")?,
            fed_at: row.get("fed_at")?,
            amount_grams: u32_column::<Self>(row, "amount_grams")?,
            cost_cents: row.get("cost_cents")?,
            performed_by: optional_uuid_column::<Self>(row, "performed_by")?,
        })
    }
}

impl TableRow for Task {
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "due_at",
        "priority",
        "status",
        "assigned_to",
        "completed_at",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.title),
            text(&self.description),
            Value::Integer(self.due_at),
            text(self.priority.as_str()),
            text(self.status.as_str()),
            optional_id_value(self.assigned_to),
            optional_integer(self.completed_at),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self> {
        Ok(Self {
            meta,
            title: row.get("title")?,
            description: row.get("description")?,
            due_at: row.get("due_at")?,
            priority: tag_column::<Self, _>(row, "priority", TaskPriority::parse)?,
            status: tag_column::<Self, _>(row, "status", TaskStatus::parse)?,
            assigned_to: optional_uuid_column::<Self>(row, "assigned_to")?,
            completed_at: row.get("completed_at")?,
        })
    }
}
