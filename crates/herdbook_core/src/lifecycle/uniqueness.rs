//! Active-row uniqueness invariants.
//!
//! Each invariant mirrors a partial unique index `... WHERE is_deleted = 0`.
//! The checks here run first so callers get a readable `ValidationError`
//! instead of a raw constraint failure; the index stays the backstop.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::model::entity::{EntityKind, EntityRef};
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

/// `UNIQUE(fields) WHERE is_deleted = 0` on `kind`'s table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniquenessInvariant {
    pub kind: EntityKind,
    pub fields: &'static [&'static str],
}

pub const HERDBOOK_UNIQUENESS: &[UniquenessInvariant] = &[
    UniquenessInvariant {
        kind: EntityKind::User,
        fields: &["username"],
    },
    UniquenessInvariant {
        kind: EntityKind::Cattle,
        fields: &["tag"],
    },
    UniquenessInvariant {
        kind: EntityKind::Medication,
        fields: &["name"],
    },
    UniquenessInvariant {
        kind: EntityKind::SanitaryEventTarget,
        fields: &["event_id", "animal_id"],
    },
    UniquenessInvariant {
        kind: EntityKind::WeightRecord,
        fields: &["session_id", "animal_id"],
    },
    UniquenessInvariant {
        kind: EntityKind::Calving,
        fields: &["calf_id"],
    },
    UniquenessInvariant {
        kind: EntityKind::DietItem,
        fields: &["diet_id", "ingredient_id"],
    },
    UniquenessInvariant {
        kind: EntityKind::MovementAnimal,
        fields: &["movement_id", "animal_id"],
    },
];

pub fn invariants_for(kind: EntityKind) -> impl Iterator<Item = &'static UniquenessInvariant> {
    HERDBOOK_UNIQUENESS
        .iter()
        .filter(move |invariant| invariant.kind == kind)
}

/// Checks values about to be written for `target` against other active rows.
///
/// `columns` and `values` are parallel. Invariants with a NULL member are
/// skipped, as SQLite does for the index.
pub(crate) fn ensure_unique_values(
    conn: &Connection,
    target: EntityRef,
    columns: &[&'static str],
    values: &[Value],
) -> LifecycleResult<()> {
    for invariant in invariants_for(target.kind) {
        let mut bound = Vec::with_capacity(invariant.fields.len() + 1);
        for field in invariant.fields {
            let position = columns
                .iter()
                .position(|column| column == field)
                .ok_or_else(|| {
                    LifecycleError::InvalidData(format!(
                        "unique field `{field}` is not a column of {}",
                        target.kind.table()
                    ))
                })?;
            bound.push(values[position].clone());
        }
        if bound.iter().any(|value| matches!(value, Value::Null)) {
            continue;
        }

        let predicate = invariant
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| format!("{field} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT EXISTS(
                SELECT 1 FROM {} WHERE {predicate} AND is_deleted = 0 AND id <> ?{}
            );",
            target.kind.table(),
            invariant.fields.len() + 1
        );

        let described = describe(invariant.fields, &bound);
        bound.push(Value::Text(target.id.to_string()));
        let mut stmt = conn.prepare_cached(&sql)?;
        let taken = stmt.query_row(params_from_iter(bound.iter()), |row| row.get::<_, i64>(0))?;
        if taken == 1 {
            return Err(ValidationError::new(
                "unique_conflict",
                format!("{described} is already in use by an active record."),
            )
            .into());
        }
    }
    Ok(())
}

/// Checks whether restoring `target` would collide with an active row.
pub(crate) fn ensure_restorable(conn: &Connection, target: EntityRef) -> LifecycleResult<()> {
    let table = target.kind.table();
    for invariant in invariants_for(target.kind) {
        let selected = invariant
            .fields
            .iter()
            .map(|field| format!("me.{field}"))
            .collect::<Vec<_>>()
            .join(", ");
        let joined = invariant
            .fields
            .iter()
            .map(|field| format!("other.{field} = me.{field}"))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT {selected}
             FROM {table} me
             JOIN {table} other ON {joined}
             WHERE me.id = ?1 AND other.id <> me.id AND other.is_deleted = 0
             LIMIT 1;"
        );

        let field_count = invariant.fields.len();
        let mut stmt = conn.prepare_cached(&sql)?;
        let conflict = stmt
            .query_row([target.id.to_string()], |row| {
                (0..field_count)
                    .map(|index| row.get::<_, Value>(index))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .optional()?;

        if let Some(values) = conflict {
            return Err(ValidationError::new(
                "unique_conflict",
                format!(
                    "Cannot restore: {} is already in use by an active record.",
                    describe(invariant.fields, &values)
                ),
            )
            .into());
        }
    }
    Ok(())
}

fn describe(fields: &[&str], values: &[Value]) -> String {
    fields
        .iter()
        .zip(values)
        .map(|(field, value)| format!("{field} '{}'", display_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(number) => number.to_string(),
        Value::Real(number) => number.to_string(),
        Value::Text(text) => text.clone(),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, invariants_for};
    use crate::model::entity::EntityKind;
    use rusqlite::types::Value;

    #[test]
    fn composite_invariants_keep_field_order() {
        let fields: Vec<_> = invariants_for(EntityKind::WeightRecord)
            .flat_map(|invariant| invariant.fields.iter().copied())
            .collect();
        assert_eq!(fields, vec!["session_id", "animal_id"]);
        assert_eq!(invariants_for(EntityKind::Location).count(), 0);
    }

    #[test]
    fn describe_quotes_each_value() {
        let text = describe(
            &["event_id", "animal_id"],
            &[Value::Text("e1".to_string()), Value::Text("a1".to_string())],
        );
        assert_eq!(text, "event_id 'e1', animal_id 'a1'");
    }
}
