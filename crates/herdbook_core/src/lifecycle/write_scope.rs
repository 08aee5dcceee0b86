//! Atomic write boundary for lifecycle mutations.
//!
//! # Responsibility
//! - Open an `IMMEDIATE` transaction when the connection is in autocommit
//!   mode.
//! - Nest inside a caller's open transaction through a savepoint instead.
//!
//! # Invariants
//! - Dropping an uncommitted scope undoes only the scope's own writes; a
//!   caller's transaction stays open and usable.
//! - A nested scope never commits the caller's transaction.

use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::ops::Deref;

const SAVEPOINT: &str = "herdbook_write";

pub(crate) enum WriteScope<'conn> {
    Outer(Transaction<'conn>),
    Nested(NestedWrite<'conn>),
}

impl<'conn> WriteScope<'conn> {
    pub(crate) fn begin(conn: &'conn Connection) -> rusqlite::Result<Self> {
        if conn.is_autocommit() {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            return Ok(Self::Outer(tx));
        }
        conn.execute_batch(&format!("SAVEPOINT {SAVEPOINT};"))?;
        Ok(Self::Nested(NestedWrite {
            conn,
            released: false,
        }))
    }

    pub(crate) fn commit(self) -> rusqlite::Result<()> {
        match self {
            Self::Outer(tx) => tx.commit(),
            Self::Nested(mut nested) => {
                nested
                    .conn
                    .execute_batch(&format!("RELEASE {SAVEPOINT};"))?;
                nested.released = true;
                Ok(())
            }
        }
    }
}

impl Deref for WriteScope<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::Outer(tx) => &**tx,
            Self::Nested(nested) => nested.conn,
        }
    }
}

pub(crate) struct NestedWrite<'conn> {
    conn: &'conn Connection,
    released: bool,
}

impl Drop for NestedWrite<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let sql = format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT};");
        if let Err(err) = self.conn.execute_batch(&sql) {
            warn!("event=write_scope_rollback module=lifecycle status=error error={err}");
        }
    }
}
