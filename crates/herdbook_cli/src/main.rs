//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `herdbook_core` linkage and configuration loading.
//! - Print per-kind active/trashed counts as a read-path sanity check.
//! - Keep output deterministic for quick local checks.

use herdbook_core::db::open_db_with;
use herdbook_core::{core_version, init_logging_from, CoreConfig, EntityKind, EntityStore};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("herdbook: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env()?;
    init_logging_from(&config)?;

    println!("herdbook_core version={}", core_version());
    let conn = open_db_with(&config).map_err(|err| err.to_string())?;
    let store = EntityStore::try_new(&conn).map_err(|err| err.to_string())?;

    for kind in EntityKind::ALL {
        let (active, trashed) = store.counts(kind).map_err(|err| err.to_string())?;
        println!("{kind} active={active} trashed={trashed}");
    }

    info!("event=cli_smoke module=cli status=ok");
    Ok(())
}
