use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// One schema step. Versions sort lexically and are applied in order.
struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "launch_date_index",
        sql: include_str!("migrations/002_launch_date_index.sql"),
    },
];

/// Bring the schema up to date and return the versions applied by this call.
pub fn run_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let done = applied_versions(conn)?;
    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| !done.contains(m.version)) {
        apply(conn, migration)?;
        applied.push(migration.version);
    }

    if applied.is_empty() {
        tracing::debug!("Schema is up to date");
    }
    Ok(applied)
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(versions)
}

/// Runs the migration and records it in the same transaction.
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!("Applying migration {} ({})", migration.version, migration.name);

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)
        .with_context(|| format!("Migration {} ({}) failed", migration.version, migration.name))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (
            migration.version,
            migration.name,
            chrono::Utc::now().to_rfc3339(),
        ),
    )?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> HashSet<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn fresh_database_gets_every_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), vec!["001", "002"]);

        let tables = tables(&conn);
        for table in ["launch_service_providers", "rockets", "launches", "payloads", "users"] {
            assert!(tables.contains(table), "missing table {}", table);
        }
    }

    #[test]
    fn second_run_applies_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert!(run_migrations(&conn).unwrap().is_empty());
        assert_eq!(applied_versions(&conn).unwrap().len(), MIGRATIONS.len());
    }

    #[test]
    fn picks_up_where_a_database_left_off() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute_batch(
            "DROP INDEX idx_launches_date;
             DROP INDEX idx_launches_orbit;
             DELETE FROM schema_migrations WHERE version = '002';",
        )
        .unwrap();

        assert_eq!(run_migrations(&conn).unwrap(), vec!["002"]);
    }

    #[test]
    fn failed_migration_is_not_recorded() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE launches (id TEXT)").unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(err.to_string().contains("Migration 001 (initial) failed"));
        assert!(applied_versions(&conn).unwrap().is_empty());
    }
}
