//! Row mapping contract between entity types and their tables.
//!
//! # Invariants
//! - Base columns (`id`, `created_at`, `modified_at`, `is_deleted`) are
//!   handled here; `COLUMNS` lists domain columns only.
//! - `to_values` yields one value per `COLUMNS` entry, in the same order.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::model::entity::{Entity, EntityId, EntityMeta};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

const BASE_COLUMNS: [&str; 4] = ["id", "created_at", "modified_at", "is_deleted"];

/// An entity that maps onto one SQLite table.
pub trait TableRow: Entity + Sized {
    /// Domain columns, without the base columns.
    const COLUMNS: &'static [&'static str];

    fn to_values(&self) -> Vec<Value>;

    /// Builds the entity from a row selected with base and domain columns.
    fn from_row(meta: EntityMeta, row: &Row<'_>) -> LifecycleResult<Self>;
}

/// Declared column named `column`, base or domain.
pub(crate) fn known_column<T: TableRow>(column: &str) -> Option<&'static str> {
    BASE_COLUMNS
        .iter()
        .chain(T::COLUMNS.iter())
        .copied()
        .find(|known| *known == column)
}

pub(crate) fn select_list<T: TableRow>() -> String {
    BASE_COLUMNS
        .iter()
        .chain(T::COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn parse_meta<T: TableRow>(row: &Row<'_>) -> LifecycleResult<EntityMeta> {
    let id = uuid_column::<T>(row, "id")?;
    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(LifecycleError::InvalidData(format!(
                "invalid is_deleted value `{other}` in {}.is_deleted",
                T::KIND.table()
            )));
        }
    };
    Ok(EntityMeta::from_parts(
        id,
        row.get("created_at")?,
        row.get("modified_at")?,
        is_deleted,
    ))
}

pub(crate) fn parse_entity<T: TableRow>(row: &Row<'_>) -> LifecycleResult<T> {
    let meta = parse_meta::<T>(row)?;
    let entity = T::from_row(meta, row)?;
    entity.validate().map_err(|err| {
        LifecycleError::InvalidData(format!(
            "{} row failed validation: {}",
            T::KIND.table(),
            err.code()
        ))
    })?;
    Ok(entity)
}

pub(crate) fn uuid_column<T: TableRow>(
    row: &Row<'_>,
    column: &'static str,
) -> LifecycleResult<EntityId> {
    let text: String = row.get(column)?;
    parse_uuid::<T>(&text, column)
}

pub(crate) fn optional_uuid_column<T: TableRow>(
    row: &Row<'_>,
    column: &'static str,
) -> LifecycleResult<Option<EntityId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Ok(Some(parse_uuid::<T>(&text, column)?)),
        None => Ok(None),
    }
}

pub(crate) fn flag_column<T: TableRow>(
    row: &Row<'_>,
    column: &'static str,
) -> LifecycleResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LifecycleError::InvalidData(format!(
            "invalid flag `{other}` in {}.{column}",
            T::KIND.table()
        ))),
    }
}

pub(crate) fn u32_column<T: TableRow>(row: &Row<'_>, column: &'static str) -> LifecycleResult<u32> {
    let raw: i64 = row.get(column)?;
    u32::try_from(raw).map_err(|_| {
        LifecycleError::InvalidData(format!(
            "value `{raw}` out of range in {}.{column}",
            T::KIND.table()
        ))
    })
}

pub(crate) fn optional_u32_column<T: TableRow>(
    row: &Row<'_>,
    column: &'static str,
) -> LifecycleResult<Option<u32>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(raw) => u32::try_from(raw).map(Some).map_err(|_| {
            LifecycleError::InvalidData(format!(
                "value `{raw}` out of range in {}.{column}",
                T::KIND.table()
            ))
        }),
        None => Ok(None),
    }
}

/// Parses a closed set of text tags stored in `column`.
pub(crate) fn tag_column<T: TableRow, V>(
    row: &Row<'_>,
    column: &'static str,
    parse: fn(&str) -> Option<V>,
) -> LifecycleResult<V> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| {
        LifecycleError::InvalidData(format!(
            "invalid value `{raw}` in {}.{column}",
            T::KIND.table()
        ))
    })
}

fn parse_uuid<T: TableRow>(value: &str, column: &'static str) -> LifecycleResult<EntityId> {
    Uuid::parse_str(value).map_err(|_| {
        LifecycleError::InvalidData(format!(
            "invalid uuid `{value}` in {}.{column}",
            T::KIND.table()
        ))
    })
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

pub(crate) fn id_value(id: EntityId) -> Value {
    Value::Text(id.to_string())
}

pub(crate) fn optional_id_value(id: Option<EntityId>) -> Value {
    id.map_or(Value::Null, id_value)
}

pub(crate) fn flag_value(flag: bool) -> Value {
    Value::Integer(i64::from(flag))
}

pub(crate) fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}
