//! Versioned schema for the `documents` table.
//!
//! # Invariants
//! - Steps are listed in increasing `version` order, without gaps.
//! - A run applies every pending step in one transaction or none of them.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    Step {
        version: 2,
        name: "list_index",
        sql: include_str!("0002_list_index.sql"),
    },
];

/// Schema version this build creates.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the connected file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the connected file up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the file is ahead of this build.
/// - `MigrationFailed` naming the first step that did not apply.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > found) {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}

fn run_step(tx: &Transaction<'_>, step: &Step) -> DbResult<()> {
    let wrap = |source| DbError::MigrationFailed {
        version: step.version,
        name: step.name,
        source,
    };
    tx.execute_batch(step.sql).map_err(wrap)?;
    tx.pragma_update(None, "user_version", step.version)
        .map_err(wrap)?;
    debug!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}
