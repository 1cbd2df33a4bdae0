//! Architecture Validation Integration Tests
//!
//! Confirms that `Library` and the store types can be driven entirely through
//! the `pdfshelf::` crate root, without any CLI types (clap, dirs, dotenvy).
//! A desktop or web front end should be able to reuse the library as is.
//!
//! This file must NOT import anything from main.rs.

use anyhow::Result;
use pdfshelf::{
    Collection, CollectionFilter, CollectionId, CollectionStore, Database, Document, DocumentId,
    DocumentMetadata, DocumentStore, Library, Outcome, StoreError, WHOLE_LIBRARY_LABEL,
};

/// Helper for `Library` instantiation backed by an in-memory database.
fn create_test_library() -> Library {
    let db = Database::in_memory().expect("failed to create in-memory database");
    Library::new(db)
}

fn sample_document(title: &str) -> Document {
    Document::new(
        DocumentId::generate(),
        format!("/library/{title}.pdf"),
        DocumentMetadata::default().with_title(title),
    )
}

// =============================================================================
// Library isolation
// =============================================================================

#[test]
fn test_library_instantiates_without_cli_context() {
    // Arrange: in-memory database, no configuration or environment
    let db = Database::in_memory().expect("failed to create in-memory database");

    // Act
    let library = Library::new(db);

    // Assert: schema is initialized through the public accessor
    let count: i64 = library
        .database()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' \
             AND name IN ('pdf_catalog', 'collections', 'collection_links')",
            [],
            |row| row.get(0),
        )
        .expect("failed to query schema");

    assert_eq!(count, 3, "expected the three library tables");
}

#[test]
fn test_stores_are_usable_directly() -> Result<()> {
    // Arrange
    let db = Database::in_memory()?;
    let documents = DocumentStore::new(&db);
    let collections = CollectionStore::new(&db);
    let document = sample_document("Direct");

    // Act
    documents.insert(&document)?;
    let collection_id = collections.insert_collection("Reading")?;
    let outcome = collections.link(document.id(), collection_id)?;

    // Assert
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(collections.documents_for_collection(collection_id)?, vec![document]);

    Ok(())
}

// =============================================================================
// Public types
// =============================================================================

#[test]
fn test_whole_library_filter_is_in_memory_only() -> Result<()> {
    // Arrange
    let library = create_test_library();
    library.create_collection("Research")?;

    // Act
    let persisted: Vec<Collection> = library.list_collections()?;

    // Assert: the pseudo-collection never shows up in storage
    assert!(persisted.iter().all(|c| c.name != WHOLE_LIBRARY_LABEL));
    assert_eq!(CollectionFilter::default(), CollectionFilter::WholeLibrary);

    Ok(())
}

#[test]
fn test_ids_round_trip_through_strings() -> Result<()> {
    // Arrange
    let document_id = DocumentId::generate();
    let collection_id = CollectionId::generate();

    // Act
    let parsed_document: DocumentId = document_id.to_string().parse()?;
    let parsed_collection: CollectionId = collection_id.to_string().to_uppercase().parse()?;

    // Assert
    assert_eq!(parsed_document, document_id);
    assert_eq!(parsed_collection, collection_id);

    Ok(())
}

#[test]
fn test_store_errors_classify_user_mistakes() {
    // Arrange
    let library = create_test_library();
    let missing = DocumentId::generate();

    // Act
    let err = library
        .remove_document(missing)
        .expect_err("removing a missing document should fail");

    // Assert
    assert!(matches!(err, StoreError::DocumentNotFound(id) if id == missing));
    assert!(err.is_user_error());
}

#[test]
fn test_library_values_serialize_to_json() -> Result<()> {
    // Arrange
    let document = sample_document("Serialized");

    // Act
    let json = serde_json::to_value(&document)?;

    // Assert: ids serialize as plain hyphenated strings
    assert_eq!(json["id"], document.id().to_string());
    assert_eq!(json["metadata"]["title"], "Serialized");
    assert_eq!(json["metadata"]["author"], "");

    Ok(())
}
