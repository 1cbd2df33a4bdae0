use rusqlite::Connection;
use time::OffsetDateTime;

use super::schema::{INITIAL_SCHEMA, LINK_INTEGRITY};
use crate::error::{Result, StoreError};

/// Individual migration with version metadata.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

impl Migration {
    /// Creates a new migration.
    pub const fn new(version: u32, description: &'static str, up: &'static str) -> Self {
        Self {
            version,
            description,
            up,
        }
    }

    /// Checks if this migration has been applied to the database.
    pub fn is_applied(&self, conn: &Connection) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
            [self.version],
            |row| row.get(0),
        )
    }

    /// Applies this migration and records it in schema_migrations, atomically.
    pub fn apply(&self, conn: &mut Connection) -> rusqlite::Result<()> {
        let tx = conn.transaction()?;

        tx.execute_batch(self.up)?;

        let applied_at = OffsetDateTime::now_utc().unix_timestamp();
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![self.version, applied_at, self.description],
        )?;

        tx.commit()
    }
}

/// Registry of all migrations in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "Initial schema: create pdf_catalog, collections, collection_links tables",
        INITIAL_SCHEMA,
    ),
    Migration::new(
        2,
        "Normalize ids to lowercase, deduplicate collection links, add link indexes",
        LINK_INTEGRITY,
    ),
];

/// Applies all pending migrations in version order.
///
/// Returns the number of migrations applied by this call.
pub fn apply_pending_migrations(conn: &mut Connection) -> Result<usize> {
    ensure_migration_table_exists(conn)
        .map_err(|source| StoreError::Migration { version: 0, source })?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        let done = migration
            .is_applied(conn)
            .map_err(|source| StoreError::Migration {
                version: migration.version,
                source,
            })?;
        if done {
            continue;
        }

        migration
            .apply(conn)
            .map_err(|source| StoreError::Migration {
                version: migration.version,
                source,
            })?;
        tracing::info!(
            version = migration.version,
            description = migration.description,
            "applied migration"
        );
        applied += 1;
    }

    Ok(applied)
}

/// Returns the highest applied migration version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
}

/// Creates the schema_migrations table if it doesn't exist.
fn ensure_migration_table_exists(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        );
        "#,
    )
}
