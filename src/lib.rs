//! Persistence layer for a personal PDF library.
//!
//! The catalog stores one record per imported PDF, collections group
//! documents many-to-many, and [`Library`] composes both into the queries a
//! library panel needs. [`pdf`] reads the document information dictionary of
//! a file on disk so metadata can be pre-filled before a document is added.

pub mod browse;
pub mod collections;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod library;
pub mod models;
pub mod pdf;

pub use collections::CollectionStore;
pub use config::Config;
pub use db::Database;
pub use documents::DocumentStore;
pub use error::{Result, StoreError};
pub use library::Library;
pub use models::{
    Collection, CollectionFilter, CollectionId, Document, DocumentId, DocumentMetadata,
    MetadataKey, MetadataMap, Outcome, WHOLE_LIBRARY_LABEL,
};
