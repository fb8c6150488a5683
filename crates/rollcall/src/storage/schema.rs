//! `SQLite` schema for the slot store.
//!
//! The database is a plain key/value table. The roster collections are
//! opaque payloads to it.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Version of the slot table layout written by this build.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the table layout version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// SQL statement to create the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SLOTS_TABLE, CREATE_METADATA_TABLE];

/// Create the tables if needed and stamp the layout version.
///
/// # Errors
///
/// Returns an error if table creation fails or the database was written by
/// a newer build with an unknown layout.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match schema_version(conn)? {
        0 => set_schema_version(conn, CURRENT_VERSION),
        CURRENT_VERSION => Ok(()),
        other => Err(Error::DatabaseMigration {
            message: format!(
                "database layout version {other} is not supported (expected {CURRENT_VERSION})"
            ),
        }),
    }
}

/// Get the layout version from the database.
///
/// Returns 0 if no version is set (fresh database).
///
/// # Errors
///
/// Returns an error if the stored version cannot be read or parsed.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
