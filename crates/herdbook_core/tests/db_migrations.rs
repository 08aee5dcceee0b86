use herdbook_core::db::migrations::latest_version;
use herdbook_core::db::{open_db, open_db_in_memory, open_db_with, DbError};
use herdbook_core::lifecycle::HERDBOOK_RELATIONS;
use herdbook_core::{CoreConfig, EntityKind, EntityStore, LifecycleError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for kind in EntityKind::ALL {
        assert_table_exists(&conn, kind.table());
    }
}

#[test]
fn foreign_keys_are_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("herdbook.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "cattle");
}

#[test]
fn open_db_with_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = CoreConfig {
        db_path: Some(path.clone()),
        busy_timeout_ms: 100,
        ..CoreConfig::default()
    };

    let conn = open_db_with(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_migration_names_the_step_and_leaves_version_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clashing.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE users (id TEXT PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "migration_failed");
    match err {
        DbError::MigrationFailed { version, name, .. } => {
            assert_eq!(version, 1);
            assert_eq!(name, "herd_and_commerce");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
}

#[test]
fn relation_hard_delete_actions_match_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT on_delete FROM pragma_foreign_key_list(?1)
             WHERE \"from\" = ?2 AND \"table\" = ?3;",
        )
        .unwrap();

    for relation in HERDBOOK_RELATIONS {
        let on_delete: String = stmt
            .query_row(
                [
                    relation.source.table(),
                    relation.target_field,
                    relation.target.table(),
                ],
                |row| row.get(0),
            )
            .unwrap_or_else(|err| panic!("no foreign key for {relation:?}: {err}"));
        assert_eq!(on_delete, relation.on_hard_delete.as_sql(), "{relation:?}");
    }
}

#[test]
fn every_foreign_key_is_registered_as_a_relation() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT \"from\" FROM pragma_foreign_key_list(?1);")
        .unwrap();

    for kind in EntityKind::ALL {
        let fields = stmt
            .query_map([kind.table()], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        for field in fields {
            assert!(
                HERDBOOK_RELATIONS
                    .iter()
                    .any(|relation| relation.source == kind && relation.target_field == field),
                "{}.{field} has no registered relation",
                kind.table()
            );
        }
    }
}

#[test]
fn entity_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match EntityStore::try_new(&conn) {
        Err(LifecycleError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("store accepted an unmigrated connection"),
    }
}

#[test]
fn active_uniqueness_index_allows_reuse_after_trash() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO medications (id, created_at, modified_at, is_deleted, name)
         VALUES ('m1', 1, 1, 1, 'Ivermectin');
         INSERT INTO medications (id, created_at, modified_at, is_deleted, name)
         VALUES ('m2', 2, 2, 0, 'Ivermectin');",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO medications (id, created_at, modified_at, is_deleted, name)
         VALUES ('m3', 3, 3, 0, 'Ivermectin');",
        [],
    );
    assert!(duplicate.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
