//! Ordered schema history of the booking database.
//!
//! Each entry is applied once, in version order, inside a single
//! transaction together with every other pending entry. A failure leaves
//! the file at its previous version.
//!
//! # Invariants
//! - Versions start at 1 and increase by one.
//! - `customers` and `reservations` column names are read by host SQL and
//!   must never be renamed by a later entry.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    // Both tables with their fixed column names. Reservations reference
    // customers through a foreign key; there is no cascade, so a customer
    // with bookings cannot be removed.
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    // Lookups on the hot paths: duplicate-phone check, name ordering and
    // per-customer reservation listing. Phone stays non-unique; the
    // repository decides when duplicates matter.
    Migration {
        version: 2,
        name: "lookup_indexes",
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Highest schema version this build can create or read.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        debug!("event=db_migrate module=db status=skip version={from_version}");
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().skip_while(|m| m.version <= from_version) {
        run_migration(&tx, migration)?;
        applied.push(migration.name);
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        from_version,
        latest,
        applied.join(",")
    );
    Ok(())
}

fn run_migration(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    Ok(())
}
