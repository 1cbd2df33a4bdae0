use crate::collections::CollectionStore;
use crate::documents::DocumentStore;
use crate::error::{Result, StoreError};
use crate::{
    Collection, CollectionFilter, CollectionId, Database, Document, DocumentId, Outcome,
    WHOLE_LIBRARY_LABEL,
};

/// Entry point for everything the library panel and metadata editor need.
///
/// `Library` owns a [`Database`] and composes the document and collection
/// stores. Reads are pure compositions; mutations that touch both stores run
/// in a single transaction. It holds no state besides the database handle and
/// can be used by the CLI or any other front end.
///
/// # Examples
///
/// ```
/// use pdfshelf::{CollectionFilter, Database, Library};
///
/// # fn main() -> anyhow::Result<()> {
/// let library = Library::new(Database::in_memory()?);
/// assert!(library.displayed_documents(CollectionFilter::WholeLibrary)?.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct Library {
    db: Database,
}

impl Library {
    /// Creates a library over the given database, taking ownership of it.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Borrows the document record store.
    pub fn documents(&self) -> DocumentStore<'_> {
        DocumentStore::new(&self.db)
    }

    /// Borrows the collection store.
    pub fn collections(&self) -> CollectionStore<'_> {
        CollectionStore::new(&self.db)
    }

    /// Returns what the library panel should show for the active filter.
    ///
    /// The whole-library filter is never persisted, so it is answered from the
    /// catalog directly without consulting the link table.
    pub fn displayed_documents(&self, filter: CollectionFilter) -> Result<Vec<Document>> {
        match filter {
            CollectionFilter::WholeLibrary => self.documents().fetch_all(),
            CollectionFilter::Collection(id) => self.collections().documents_for_collection(id),
        }
    }

    /// Adds a document to the library and links it to `collections`.
    ///
    /// The title must not be blank and every collection must exist. Insert
    /// and links are applied atomically: on any error nothing is written.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfshelf::{Database, Document, DocumentId, DocumentMetadata, Library};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let library = Library::new(Database::in_memory()?);
    /// let research = library.create_collection("Research")?;
    ///
    /// let doc = Document::new(
    ///     DocumentId::generate(),
    ///     "/papers/a.pdf",
    ///     DocumentMetadata::default().with_title("Paper A"),
    /// );
    /// library.add_document(&doc, &[research.id])?;
    ///
    /// assert_eq!(library.documents_for_collection(research.id)?, vec![doc]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_document(&self, document: &Document, collections: &[CollectionId]) -> Result<()> {
        if document.metadata().title.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "a title is required to add a document to the library".to_string(),
            ));
        }

        self.db.in_transaction(|| {
            self.documents().insert(document)?;
            for collection_id in collections {
                if self.collections().get(*collection_id)?.is_none() {
                    return Err(StoreError::CollectionNotFound(*collection_id));
                }
                self.collections().link(document.id(), *collection_id)?;
            }
            Ok(())
        })?;

        tracing::info!(
            id = %document.id(),
            collections = collections.len(),
            "added document to library"
        );
        Ok(())
    }

    /// Writes the document's path and metadata over the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the document is not in the library.
    pub fn update_document(&self, document: &Document) -> Result<()> {
        match self.documents().update(document)? {
            Outcome::Changed => Ok(()),
            Outcome::Unchanged => Err(StoreError::DocumentNotFound(document.id())),
        }
    }

    /// Removes a document and all of its collection memberships atomically.
    ///
    /// Returns the number of memberships removed alongside the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the document is not in the library.
    pub fn remove_document(&self, id: DocumentId) -> Result<usize> {
        let detached = self.db.in_transaction(|| {
            if self.documents().delete(id)? == Outcome::Unchanged {
                return Err(StoreError::DocumentNotFound(id));
            }
            self.collections().detach_document(id)
        })?;

        tracing::info!(%id, detached, "removed document from library");
        Ok(detached)
    }

    /// Creates a collection named `name` (trimmed) and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a blank name or the reserved
    /// whole-library label.
    pub fn create_collection(&self, name: &str) -> Result<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput(
                "collection name cannot be empty".to_string(),
            ));
        }
        if name.eq_ignore_ascii_case(WHOLE_LIBRARY_LABEL) {
            return Err(StoreError::InvalidInput(format!(
                "\"{WHOLE_LIBRARY_LABEL}\" is reserved for the whole library"
            )));
        }

        let id = self.collections().insert_collection(name)?;
        Ok(Collection::new(id, name))
    }

    /// Deletes a collection together with its memberships, atomically.
    ///
    /// Documents themselves are untouched. Returns the number of memberships removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CollectionNotFound`] if the collection does not exist.
    pub fn delete_collection(&self, id: CollectionId) -> Result<usize> {
        let detached = self.db.in_transaction(|| {
            if self.collections().delete_collection(id)? == Outcome::Unchanged {
                return Err(StoreError::CollectionNotFound(id));
            }
            self.collections().detach_collection(id)
        })?;

        tracing::info!(%id, detached, "deleted collection");
        Ok(detached)
    }

    /// Every persisted collection, in creation order.
    pub fn list_collections(&self) -> Result<Vec<Collection>> {
        self.collections().fetch_collections()
    }

    /// Links a document to a collection. Re-linking is a no-op.
    pub fn link(&self, document_id: DocumentId, collection_id: CollectionId) -> Result<Outcome> {
        self.collections().link(document_id, collection_id)
    }

    /// Unlinks a document from a collection. The document stays in the library.
    pub fn unlink(&self, document_id: DocumentId, collection_id: CollectionId) -> Result<Outcome> {
        self.collections().unlink(document_id, collection_id)
    }

    /// Collections the document belongs to.
    pub fn collections_for_document(&self, document_id: DocumentId) -> Result<Vec<Collection>> {
        self.collections().collections_for_document(document_id)
    }

    /// Documents belonging to the collection.
    pub fn documents_for_collection(&self, collection_id: CollectionId) -> Result<Vec<Document>> {
        self.collections().documents_for_collection(collection_id)
    }

    /// Number of memberships pointing at a missing document or collection.
    pub fn check_integrity(&self) -> Result<usize> {
        self.collections().dangling_memberships()
    }

    /// Deletes memberships pointing at a missing document or collection.
    pub fn prune_dangling(&self) -> Result<usize> {
        self.collections().prune_dangling()
    }
}
