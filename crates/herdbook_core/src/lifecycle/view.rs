//! Read-only query surface handed to delete hooks and polymorphic holders.
//!
//! # Invariants
//! - Every statement is checked with `sqlite3_stmt_readonly` before it runs;
//!   writes are rejected with `ReadOnlyViolation` and never executed.
//! - The view borrows the caller's transaction, so reads observe the same
//!   snapshot the delete will mutate.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use rusqlite::{CachedStatement, Connection, OptionalExtension, Params};

pub struct ReadView<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ReadView<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Whether `sql` yields at least one row.
    pub fn exists<P: Params>(&self, sql: &str, params: P) -> LifecycleResult<bool> {
        let mut stmt = self.prepare(sql)?;
        Ok(stmt.exists(params)?)
    }

    /// First column of the first row, if any.
    pub fn query_i64<P: Params>(&self, sql: &str, params: P) -> LifecycleResult<Option<i64>> {
        let mut stmt = self.prepare(sql)?;
        Ok(stmt
            .query_row(params, |row| row.get::<_, i64>(0))
            .optional()?)
    }

    fn prepare(&self, sql: &str) -> LifecycleResult<CachedStatement<'conn>> {
        let stmt = self.conn.prepare_cached(sql)?;
        if !stmt.readonly() {
            return Err(LifecycleError::ReadOnlyViolation);
        }
        Ok(stmt)
    }
}
