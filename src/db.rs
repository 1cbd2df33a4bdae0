mod migration;
mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{Result, StoreError};

pub use migration::{MIGRATIONS, Migration};

/// Storage handle owning the single SQLite connection.
///
/// Constructed explicitly by the application's composition root and dropped
/// with it. `Connection` is `Send` but not `Sync`, so a `Database` cannot be
/// shared between threads without the caller wrapping it in a mutex.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::StorageUnavailable {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialize(conn, None)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist. The parent directory
    /// must already exist (see [`crate::config::ensure_database_directory`]).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::initialize(conn, Some(path.to_path_buf()))
    }

    fn initialize(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let applied = migration::apply_pending_migrations(&mut conn)?;
        tracing::debug!(
            path = %path.as_deref().unwrap_or(Path::new(":memory:")).display(),
            applied,
            "database ready"
        );
        Ok(Self { conn, path })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the database file path, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the highest applied schema migration version.
    pub fn schema_version(&self) -> Result<u32> {
        Ok(migration::current_version(&self.conn)?)
    }

    /// Runs `f` inside a transaction on this connection.
    ///
    /// Commits when `f` returns `Ok`; rolls back on `Err`. Statements issued
    /// through any store borrowing this database join the transaction.
    /// Transactions do not nest.
    pub fn in_transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f()?;
        tx.commit()?;
        Ok(value)
    }
}
