//! Visibility-scoped query builder over one entity table.
//!
//! # Invariants
//! - `Active` filters `is_deleted = 0`, `Deleted` filters `is_deleted = 1`,
//!   `All` applies no flag filter.
//! - Column names are checked against the entity's declared columns before
//!   any SQL is built; values are always bound, never interpolated.
//! - Ordering always ends with `id ASC` so pages are stable.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::model::entity::{EntityId, EntityRef};
use crate::repo::table::{known_column, parse_entity, select_list, TableRow};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Active,
    All,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

pub struct Query<'conn, T: TableRow> {
    conn: &'conn Connection,
    visibility: Visibility,
    filters: Vec<(&'static str, Value)>,
    order: Vec<(&'static str, SortOrder)>,
    limit: Option<u32>,
    offset: u32,
    _entity: PhantomData<T>,
}

impl<'conn, T: TableRow> Query<'conn, T> {
    pub(crate) fn new(conn: &'conn Connection, visibility: Visibility) -> Self {
        Self {
            conn,
            visibility,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
            _entity: PhantomData,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// `column = value`; a NULL value matches `column IS NULL`.
    pub fn filter_eq(mut self, column: &str, value: impl ToSql) -> LifecycleResult<Self> {
        let column = resolve_column::<T>(column)?;
        let value = match value.to_sql()? {
            ToSqlOutput::Borrowed(borrowed) => Value::from(borrowed),
            ToSqlOutput::Owned(owned) => owned,
            _ => {
                return Err(LifecycleError::InvalidData(format!(
                    "unsupported filter value for {}.{column}",
                    T::KIND.table()
                )));
            }
        };
        self.filters.push((column, value));
        Ok(self)
    }

    /// `column = id` for id and foreign key columns.
    pub fn filter_id(self, column: &str, id: EntityId) -> LifecycleResult<Self> {
        self.filter_eq(column, id.to_string())
    }

    pub fn filter_null(mut self, column: &str) -> LifecycleResult<Self> {
        let column = resolve_column::<T>(column)?;
        self.filters.push((column, Value::Null));
        Ok(self)
    }

    pub fn order_by(mut self, column: &str, order: SortOrder) -> LifecycleResult<Self> {
        let column = resolve_column::<T>(column)?;
        self.order.push((column, order));
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn list(&self) -> LifecycleResult<Vec<T>> {
        let (sql, bind_values) = self.build(&select_list::<T>(), true);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(parse_entity::<T>(row)?);
        }
        Ok(entities)
    }

    pub fn first(self) -> LifecycleResult<Option<T>> {
        Ok(self.limit(1).list()?.into_iter().next())
    }

    /// Number of matching rows. Ignores `limit`/`offset`.
    pub fn count(&self) -> LifecycleResult<u64> {
        let (sql, bind_values) = self.build("COUNT(*)", false);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| LifecycleError::InvalidData(format!("negative row count `{count}`")))
    }

    pub fn exists(&self) -> LifecycleResult<bool> {
        let (sql, bind_values) = self.build("1", false);
        let mut stmt = self.conn.prepare(&format!("{sql} LIMIT 1"))?;
        Ok(stmt.exists(params_from_iter(bind_values))?)
    }

    /// Entity with `id` under this query's visibility and filters.
    pub fn find(self, id: EntityId) -> LifecycleResult<Option<T>> {
        self.filter_id("id", id)?.first()
    }

    /// Like `find`, but a missing entity is `NotFound`.
    pub fn get(self, id: EntityId) -> LifecycleResult<T> {
        self.find(id)?
            .ok_or_else(|| LifecycleError::not_found(EntityRef::new(T::KIND, id)))
    }

    fn build(&self, projection: &str, paged: bool) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {projection} FROM {} WHERE 1 = 1", T::KIND.table());
        let mut bind_values = Vec::with_capacity(self.filters.len() + 2);

        match self.visibility {
            Visibility::Active => sql.push_str(" AND is_deleted = 0"),
            Visibility::Deleted => sql.push_str(" AND is_deleted = 1"),
            Visibility::All => {}
        }

        for (column, value) in &self.filters {
            if matches!(value, Value::Null) {
                sql.push_str(&format!(" AND {column} IS NULL"));
            } else {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(value.clone());
            }
        }

        if !paged {
            return (sql, bind_values);
        }

        if self.order.is_empty() {
            sql.push_str(" ORDER BY created_at ASC, id ASC");
        } else {
            let clauses = self
                .order
                .iter()
                .map(|(column, order)| format!("{column} {}", order.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {clauses}, id ASC"));
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }

        (sql, bind_values)
    }
}

fn resolve_column<T: TableRow>(column: &str) -> LifecycleResult<&'static str> {
    known_column::<T>(column).ok_or_else(|| LifecycleError::UnknownColumn {
        kind: T::KIND,
        column: column.to_string(),
    })
}
