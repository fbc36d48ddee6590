//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use recall_core::error::RecallError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), RecallError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| RecallError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| RecallError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: collections");
    }

    Ok(())
}

/// Version 1: collections and their records.
///
/// `seq` preserves insertion order; `(collection, id)` is unique.
fn apply_v1(conn: &Connection) -> Result<(), RecallError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS collections (
            name        TEXT PRIMARY KEY NOT NULL,
            dimensions  INTEGER CHECK (dimensions IS NULL OR dimensions > 0),
            created_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            collection  TEXT NOT NULL REFERENCES collections (name),
            id          TEXT NOT NULL,
            text        TEXT NOT NULL,
            vector      BLOB NOT NULL,
            UNIQUE (collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_collection_seq
            ON records (collection, seq);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'collections');
        ",
    )
    .map_err(|e| RecallError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }
}
