//! Connection bootstrap for file and in-memory herdbook databases.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, read back after setting.
//! - Returned connections have migrations fully applied.
//! - Every entity table carries `id`, `created_at`, `modified_at` and
//!   `is_deleted`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::{CoreConfig, DEFAULT_BUSY_TIMEOUT_MS};
use crate::model::entity::EntityKind;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a database file with default settings and applies pending migrations.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_and_bootstrap("file", DEFAULT_BUSY_TIMEOUT_MS, || {
        Connection::open(path.as_ref())
    })
}

/// Opens an in-memory database and applies all migrations.
///
/// Used by tests and by the CLI when no database path is configured.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_and_bootstrap("memory", DEFAULT_BUSY_TIMEOUT_MS, Connection::open_in_memory)
}

/// Opens the database described by `config`.
///
/// Falls back to an in-memory database when `config.db_path` is `None`.
pub fn open_db_with(config: &CoreConfig) -> DbResult<Connection> {
    match config.db_path.as_deref() {
        Some(path) => open_and_bootstrap("file", config.busy_timeout_ms, || {
            Connection::open(path)
        }),
        None => open_and_bootstrap("memory", config.busy_timeout_ms, Connection::open_in_memory),
    }
}

fn open_and_bootstrap<F>(mode: &str, busy_timeout_ms: u64, open: F) -> DbResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, busy_timeout_ms) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout_ms: u64) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(DbError::ForeignKeysDisabled);
    }
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    apply_migrations(conn)?;
    verify_lifecycle_columns(conn)?;
    Ok(())
}

const LIFECYCLE_COLUMNS: [&str; 4] = ["id", "created_at", "modified_at", "is_deleted"];

fn verify_lifecycle_columns(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    for kind in EntityKind::ALL {
        let columns = stmt
            .query_map([kind.table()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if let Some(column) = LIFECYCLE_COLUMNS
            .into_iter()
            .find(|column| !columns.iter().any(|name| name.as_str() == *column))
        {
            return Err(DbError::MissingLifecycleColumn {
                table: kind.table(),
                column,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::verify_lifecycle_columns;
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn table_without_lifecycle_columns_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (id TEXT PRIMARY KEY, username TEXT);")
            .unwrap();

        match verify_lifecycle_columns(&conn).unwrap_err() {
            DbError::MissingLifecycleColumn { table, column } => {
                assert_eq!(table, "users");
                assert_eq!(column, "created_at");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
