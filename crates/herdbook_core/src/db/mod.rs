//! SQLite storage bootstrap for the herdbook entity tables.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the lifecycle engine.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every entity table carries `id`, `created_at`, `modified_at` and
//!   `is_deleted` columns.
//! - No entity data is read or written before migrations succeed and every
//!   entity table is verified to carry its lifecycle columns.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-layer failure. Never used to signal a business conflict.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A migration step failed; nothing from the batch was committed.
    MigrationFailed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// An entity table lacks a column every lifecycle operation relies on.
    MissingLifecycleColumn {
        table: &'static str,
        column: &'static str,
    },
    /// `PRAGMA foreign_keys` did not stay on; purges would skip the storage
    /// backstop.
    ForeignKeysDisabled,
}

impl DbError {
    /// Stable code for `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::UnsupportedSchemaVersion { .. } => "unsupported_schema_version",
            Self::MigrationFailed { .. } => "migration_failed",
            Self::MissingLifecycleColumn { .. } => "missing_lifecycle_column",
            Self::ForeignKeysDisabled => "foreign_keys_disabled",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "herdbook schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MigrationFailed {
                version,
                name,
                source,
            } => write!(f, "herdbook migration {version} ({name}) failed: {source}"),
            Self::MissingLifecycleColumn { table, column } => {
                write!(f, "entity table `{table}` has no `{column}` column")
            }
            Self::ForeignKeysDisabled => {
                f.write_str("SQLite foreign key enforcement could not be enabled")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MigrationFailed { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::MissingLifecycleColumn { .. } => None,
            Self::ForeignKeysDisabled => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
