//! Database schema migrations.
//!
//! The durable medium is a single flat key-value table; every repository
//! owns one row of it.

use rusqlite::Connection;
use tracing::info;

use dreamweaver_core::error::DreamweaverError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), DreamweaverError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| DreamweaverError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| {
            DreamweaverError::Storage(format!("Failed to query migration version: {}", e))
        })?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: kv_store");
    }

    Ok(())
}

/// Version 1: key-value table.
fn apply_v1(conn: &Connection) -> Result<(), DreamweaverError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'kv_store');
        ",
    )
    .map_err(|e| DreamweaverError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_migrations_run_once() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        // Running again should be idempotent.
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_kv_store_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES ('dreamweaver_user', '{}')",
            [],
        )
        .unwrap();

        let value: String = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = 'dreamweaver_user'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(value, "{}");
    }

    #[test]
    fn test_kv_store_key_is_unique() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute("INSERT INTO kv_store (key, value) VALUES ('k', '1')", [])
            .unwrap();
        let result = conn.execute("INSERT INTO kv_store (key, value) VALUES ('k', '2')", []);
        assert!(result.is_err());
    }
}
