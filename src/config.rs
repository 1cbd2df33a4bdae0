//! Runtime configuration: where the library database lives.
//!
//! Resolution order for the database path:
//! 1. `PDFSHELF_DB` environment variable (a `.env` file is loaded by the binary)
//! 2. `{data_dir}/pdfshelf/library.sqlite`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{Database, Library};

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "PDFSHELF_DB";

/// Application configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
}

impl Config {
    /// Resolves configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the platform data
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let database_path = match std::env::var_os(DATABASE_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };
        Ok(Self { database_path })
    }

    /// Configuration pointing at an explicit database file.
    pub fn with_database_path(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
        }
    }

    /// Creates the database directory if needed and opens the library.
    pub fn open_library(&self) -> Result<Library> {
        ensure_database_directory(&self.database_path)?;
        let db = Database::open(&self.database_path).with_context(|| {
            format!("Failed to open library at {}", self.database_path.display())
        })?;
        Ok(Library::new(db))
    }
}

/// Gets the cross-platform database path.
///
/// Returns the path as `{data_dir}/pdfshelf/library.sqlite` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("pdfshelf").join("library.sqlite"))
}

/// Ensures the parent directory of the database file exists.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}
