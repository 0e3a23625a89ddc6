//! Application-defined SQL functions.
//!
//! # Responsibility
//! - Register the scalar functions that repository queries rely on.
//!
//! # Invariants
//! - Registration is idempotent; re-registering replaces the previous
//!   definition on the same connection.
//! - Functions are deterministic and never touch the database.

use super::DbResult;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Full Unicode lowercase fold. SQLite's own `lower()` and `LIKE` only fold
/// ASCII letters.
pub const UNICODE_LOWER: &str = "unicode_lower";

/// Registers every application-defined function on `conn`.
pub fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )?;
    Ok(())
}
