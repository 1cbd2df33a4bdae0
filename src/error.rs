//! Error taxonomy for the storage layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::{CollectionId, DocumentId};

/// Errors returned by every store and library operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or its schema could not be created.
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A schema migration failed to apply.
    #[error("migration {version} failed: {source}")]
    Migration {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to execute.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A document with this id is already in the library.
    #[error("document {0} is already in the library")]
    DuplicateId(DocumentId),

    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),

    #[error("collection {0} not found")]
    CollectionNotFound(CollectionId),

    /// Caller-supplied input was rejected before touching storage.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Whether the error was caused by the caller rather than the storage layer.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateId(_)
                | StoreError::DocumentNotFound(_)
                | StoreError::CollectionNotFound(_)
                | StoreError::InvalidInput(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Returns true when a rusqlite error is a UNIQUE or PRIMARY KEY violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_classified() {
        assert!(StoreError::DuplicateId(DocumentId::generate()).is_user_error());
        assert!(StoreError::InvalidInput("blank".into()).is_user_error());
        assert!(!StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_user_error());
    }

    #[test]
    fn constraint_violation_is_detected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();

        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();

        assert!(is_constraint_violation(&err));
        assert!(!is_constraint_violation(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn storage_unavailable_message_names_the_path() {
        let err = StoreError::StorageUnavailable {
            path: PathBuf::from("/nowhere/library.sqlite"),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().contains("/nowhere/library.sqlite"));
    }
}
