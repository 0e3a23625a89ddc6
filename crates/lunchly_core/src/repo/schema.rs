//! Connection readiness checks shared by repository constructors.

use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;

/// Fails unless `table` exists with every column in `columns`.
pub(crate) fn ensure_table_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let present = table_columns(conn, table)?;
    match columns
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name.as_str() == *column))
    {
        Some(column) => Err(RepoError::MissingRequiredColumn { table, column }),
        None => Ok(()),
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
