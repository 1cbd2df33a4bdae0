//! Collection store: named collections and the document/collection link table.

use rusqlite::{OptionalExtension, params};

use crate::documents::DocumentStore;
use crate::error::Result;
use crate::{Collection, CollectionId, Database, Document, DocumentId, Outcome};

const DANGLING_LINKS: &str = "pdf_id NOT IN (SELECT id FROM pdf_catalog)
     OR collection_id NOT IN (SELECT id FROM collections)";

/// Reads and writes `collections` and `collection_links` rows.
///
/// Link operations perform no existence checks on either side; readers
/// tolerate memberships that point at missing rows.
#[derive(Clone, Copy)]
pub struct CollectionStore<'a> {
    db: &'a Database,
}

impl<'a> CollectionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Creates a collection with a freshly generated id and returns that id.
    ///
    /// The name is stored as given; uniqueness is not enforced.
    pub fn insert_collection(&self, name: &str) -> Result<CollectionId> {
        let id = CollectionId::generate();
        self.db.connection().execute(
            "INSERT INTO collections (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;

        tracing::debug!(%id, name, "inserted collection");
        Ok(id)
    }

    /// Returns every persisted collection in creation order.
    pub fn fetch_collections(&self) -> Result<Vec<Collection>> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT id, name FROM collections ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(Collection::new(row.get(0)?, row.get::<_, String>(1)?))
        })?;

        let mut collections = Vec::new();
        for row_result in rows {
            collections.push(row_result?);
        }
        Ok(collections)
    }

    /// Point lookup by id.
    pub fn get(&self, id: CollectionId) -> Result<Option<Collection>> {
        let collection = self
            .db
            .connection()
            .query_row(
                "SELECT id, name FROM collections WHERE id = ?1",
                [id],
                |row| Ok(Collection::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(collection)
    }

    /// Removes the collection row only; memberships are left in place.
    pub fn delete_collection(&self, id: CollectionId) -> Result<Outcome> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM collections WHERE id = ?1", [id])?;

        tracing::debug!(%id, rows, "deleted collection row");
        Ok(Outcome::from_rows(rows))
    }

    /// Records that `document_id` belongs to `collection_id`.
    ///
    /// Linking an existing pair is a no-op and returns [`Outcome::Unchanged`].
    pub fn link(&self, document_id: DocumentId, collection_id: CollectionId) -> Result<Outcome> {
        let rows = self.db.connection().execute(
            "INSERT OR IGNORE INTO collection_links (pdf_id, collection_id) VALUES (?1, ?2)",
            params![document_id, collection_id],
        )?;

        tracing::debug!(document = %document_id, collection = %collection_id, rows, "linked");
        Ok(Outcome::from_rows(rows))
    }

    /// Removes the membership; [`Outcome::Unchanged`] if there was none.
    pub fn unlink(&self, document_id: DocumentId, collection_id: CollectionId) -> Result<Outcome> {
        let rows = self.db.connection().execute(
            "DELETE FROM collection_links WHERE pdf_id = ?1 AND collection_id = ?2",
            params![document_id, collection_id],
        )?;

        tracing::debug!(document = %document_id, collection = %collection_id, rows, "unlinked");
        Ok(Outcome::from_rows(rows))
    }

    /// Deletes every membership of a document. Returns the number removed.
    pub fn detach_document(&self, document_id: DocumentId) -> Result<usize> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM collection_links WHERE pdf_id = ?1", [document_id])?;

        tracing::debug!(document = %document_id, rows, "detached document from collections");
        Ok(rows)
    }

    /// Deletes every membership of a collection. Returns the number removed.
    pub fn detach_collection(&self, collection_id: CollectionId) -> Result<usize> {
        let rows = self.db.connection().execute(
            "DELETE FROM collection_links WHERE collection_id = ?1",
            [collection_id],
        )?;

        tracing::debug!(collection = %collection_id, rows, "detached collection members");
        Ok(rows)
    }

    /// Returns every collection the document belongs to, each once, in creation order.
    pub fn collections_for_document(&self, document_id: DocumentId) -> Result<Vec<Collection>> {
        let mut stmt = self.db.connection().prepare(
            "SELECT c.id, c.name
             FROM collections c
             WHERE c.id IN (SELECT l.collection_id FROM collection_links l WHERE l.pdf_id = ?1)
             ORDER BY c.rowid",
        )?;
        let rows = stmt.query_map([document_id], |row| {
            Ok(Collection::new(row.get(0)?, row.get::<_, String>(1)?))
        })?;

        let mut collections = Vec::new();
        for row_result in rows {
            collections.push(row_result?);
        }
        Ok(collections)
    }

    /// Returns every document in the collection, in link order.
    ///
    /// Each member is resolved with a point lookup on the catalog. Memberships
    /// whose document no longer exists are skipped and reported in a warning.
    pub fn documents_for_collection(&self, collection_id: CollectionId) -> Result<Vec<Document>> {
        let member_ids: Vec<DocumentId> = {
            let mut stmt = self.db.connection().prepare(
                "SELECT pdf_id FROM collection_links WHERE collection_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map([collection_id], |row| row.get(0))?;

            let mut ids = Vec::new();
            for row_result in rows {
                ids.push(row_result?);
            }
            ids
        };

        let catalog = DocumentStore::new(self.db);
        let mut documents = Vec::with_capacity(member_ids.len());
        let mut dangling = 0usize;
        for id in member_ids {
            match catalog.get(id)? {
                Some(document) => documents.push(document),
                None => dangling += 1,
            }
        }

        if dangling > 0 {
            tracing::warn!(
                collection = %collection_id,
                dangling,
                "collection has memberships for documents no longer in the library"
            );
        }
        Ok(documents)
    }

    /// Counts memberships whose document or collection no longer exists.
    pub fn dangling_memberships(&self) -> Result<usize> {
        let count: i64 = self.db.connection().query_row(
            &format!("SELECT COUNT(*) FROM collection_links WHERE {DANGLING_LINKS}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Deletes memberships whose document or collection no longer exists.
    pub fn prune_dangling(&self) -> Result<usize> {
        let rows = self
            .db
            .connection()
            .execute(&format!("DELETE FROM collection_links WHERE {DANGLING_LINKS}"), [])?;

        if rows > 0 {
            tracing::info!(rows, "pruned dangling memberships");
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentMetadata;

    fn insert_doc(db: &Database, title: &str) -> Document {
        let doc = Document::new(
            DocumentId::generate(),
            format!("/papers/{title}.pdf"),
            DocumentMetadata::default().with_title(title),
        );
        DocumentStore::new(db).insert(&doc).unwrap();
        doc
    }

    #[test]
    fn insert_collection_returns_fresh_id() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);

        let first = store.insert_collection("Research").unwrap();
        let second = store.insert_collection("Research").unwrap();

        assert_ne!(first, second);
        let all = store.fetch_collections().unwrap();
        assert_eq!(
            all,
            vec![
                Collection::new(first, "Research"),
                Collection::new(second, "Research")
            ],
            "names are not required to be unique"
        );
    }

    #[test]
    fn link_twice_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let doc = insert_doc(&db, "a");
        let col = store.insert_collection("Research").unwrap();

        assert_eq!(store.link(doc.id(), col).unwrap(), Outcome::Changed);
        assert_eq!(store.link(doc.id(), col).unwrap(), Outcome::Unchanged);

        let collections = store.collections_for_document(doc.id()).unwrap();
        assert_eq!(collections, vec![Collection::new(col, "Research")]);
    }

    #[test]
    fn link_performs_no_existence_checks() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);

        let outcome = store
            .link(DocumentId::generate(), CollectionId::generate())
            .unwrap();

        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(store.dangling_memberships().unwrap(), 1);
    }

    #[test]
    fn unlink_removes_only_that_membership() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let doc = insert_doc(&db, "a");
        let research = store.insert_collection("Research").unwrap();
        let reading = store.insert_collection("Reading").unwrap();
        store.link(doc.id(), research).unwrap();
        store.link(doc.id(), reading).unwrap();

        assert_eq!(store.unlink(doc.id(), research).unwrap(), Outcome::Changed);
        assert_eq!(store.unlink(doc.id(), research).unwrap(), Outcome::Unchanged);

        let remaining = store.collections_for_document(doc.id()).unwrap();
        assert_eq!(remaining, vec![Collection::new(reading, "Reading")]);
    }

    #[test]
    fn documents_for_collection_resolves_members_in_link_order() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let a = insert_doc(&db, "a");
        let b = insert_doc(&db, "b");
        let _c = insert_doc(&db, "c");
        let col = store.insert_collection("Research").unwrap();
        store.link(b.id(), col).unwrap();
        store.link(a.id(), col).unwrap();

        let members = store.documents_for_collection(col).unwrap();

        assert_eq!(members, vec![b, a]);
    }

    #[test]
    fn documents_for_collection_skips_dangling_members() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let kept = insert_doc(&db, "kept");
        let gone = insert_doc(&db, "gone");
        let col = store.insert_collection("Research").unwrap();
        store.link(kept.id(), col).unwrap();
        store.link(gone.id(), col).unwrap();

        DocumentStore::new(&db).delete(gone.id()).unwrap();

        assert_eq!(store.documents_for_collection(col).unwrap(), vec![kept]);
        assert_eq!(store.dangling_memberships().unwrap(), 1);
    }

    #[test]
    fn detach_document_removes_all_of_its_memberships() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let doc = insert_doc(&db, "a");
        let other = insert_doc(&db, "b");
        let c1 = store.insert_collection("One").unwrap();
        let c2 = store.insert_collection("Two").unwrap();
        store.link(doc.id(), c1).unwrap();
        store.link(doc.id(), c2).unwrap();
        store.link(other.id(), c1).unwrap();

        assert_eq!(store.detach_document(doc.id()).unwrap(), 2);

        assert!(store.collections_for_document(doc.id()).unwrap().is_empty());
        assert_eq!(store.documents_for_collection(c1).unwrap(), vec![other]);
    }

    #[test]
    fn collections_for_document_hides_deleted_collections() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let doc = insert_doc(&db, "a");
        let col = store.insert_collection("Old").unwrap();
        store.link(doc.id(), col).unwrap();

        assert_eq!(store.delete_collection(col).unwrap(), Outcome::Changed);

        assert!(store.collections_for_document(doc.id()).unwrap().is_empty());
        assert_eq!(store.get(col).unwrap(), None);
        assert_eq!(store.dangling_memberships().unwrap(), 1);
    }

    #[test]
    fn prune_dangling_keeps_live_memberships() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let live = insert_doc(&db, "live");
        let col = store.insert_collection("Research").unwrap();
        store.link(live.id(), col).unwrap();
        store.link(DocumentId::generate(), col).unwrap();
        store.link(live.id(), CollectionId::generate()).unwrap();

        assert_eq!(store.prune_dangling().unwrap(), 2);

        assert_eq!(store.dangling_memberships().unwrap(), 0);
        assert_eq!(store.documents_for_collection(col).unwrap(), vec![live]);
    }

    #[test]
    fn detach_collection_removes_its_members_only() {
        let db = Database::in_memory().unwrap();
        let store = CollectionStore::new(&db);
        let doc = insert_doc(&db, "a");
        let c1 = store.insert_collection("One").unwrap();
        let c2 = store.insert_collection("Two").unwrap();
        store.link(doc.id(), c1).unwrap();
        store.link(doc.id(), c2).unwrap();

        assert_eq!(store.detach_collection(c1).unwrap(), 1);

        assert_eq!(
            store.collections_for_document(doc.id()).unwrap(),
            vec![Collection::new(c2, "Two")]
        );
    }
}
