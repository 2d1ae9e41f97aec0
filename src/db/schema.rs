//! Versioning for the session database.
//!
//! Each migration is applied in its own transaction together with the row
//! that records it, so a crash never leaves a half-applied version behind.
//! A database written by a newer build is refused instead of being read with
//! a schema this build does not understand.

use rusqlite::Connection;

use super::StoreError;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "sessions",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Newest schema version this build knows how to use.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the database up to [`latest_version`] and return the version it is at.
pub fn run_migrations(conn: &mut Connection) -> Result<u32, StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;

    let found = current_version(conn)?;
    let supported = latest_version();
    if found > supported {
        tracing::error!(
            "Session database is at schema version {}, this build supports up to {}",
            found,
            supported
        );
        return Err(StoreError::UnsupportedSchema { found, supported });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        tracing::info!("Applying session schema {}: {}", migration.version, migration.name);

        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
            (
                migration.version,
                migration.name,
                chrono::Utc::now().to_rfc3339(),
            ),
        )?;
        tx.commit()?;
    }

    Ok(supported)
}

fn current_version(conn: &Connection) -> Result<u32, StoreError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
