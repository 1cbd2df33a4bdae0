//! Document record store: one catalog row per library PDF.

use std::path::{Path, PathBuf};

use rusqlite::{OptionalExtension, Row, params};

use crate::error::{Result, StoreError, is_constraint_violation};
use crate::{Database, Document, DocumentId, DocumentMetadata, Outcome};

const SELECT_COLUMNS: &str =
    "SELECT id, file_path, title, author, subject, keywords, creation_date, producer FROM pdf_catalog";

/// Reads and writes `pdf_catalog` rows.
///
/// Borrowed from a [`Database`]; holds no state of its own.
#[derive(Clone, Copy)]
pub struct DocumentStore<'a> {
    db: &'a Database,
}

impl<'a> DocumentStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Creates a catalog row keyed by the document's id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if a row with this id already exists.
    pub fn insert(&self, document: &Document) -> Result<()> {
        let meta = document.metadata();
        let result = self.db.connection().execute(
            "INSERT INTO pdf_catalog
                 (id, file_path, title, author, subject, keywords, creation_date, producer)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                document.id(),
                path_text(document),
                meta.title,
                meta.author,
                meta.subject,
                meta.keywords,
                meta.creation_date,
                meta.producer,
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!(id = %document.id(), "inserted document");
                Ok(())
            }
            Err(e) if is_constraint_violation(&e) => Err(StoreError::DuplicateId(document.id())),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites the file path and all six metadata fields of the matching row.
    ///
    /// This is a full overwrite, never a merge: empty fields in `document`
    /// clear the stored values. Returns [`Outcome::Unchanged`] if no row matched.
    pub fn update(&self, document: &Document) -> Result<Outcome> {
        let meta = document.metadata();
        let rows = self.db.connection().execute(
            "UPDATE pdf_catalog
             SET file_path = ?2,
                 title = ?3,
                 author = ?4,
                 subject = ?5,
                 keywords = ?6,
                 creation_date = ?7,
                 producer = ?8
             WHERE id = ?1",
            params![
                document.id(),
                path_text(document),
                meta.title,
                meta.author,
                meta.subject,
                meta.keywords,
                meta.creation_date,
                meta.producer,
            ],
        )?;

        tracing::debug!(id = %document.id(), rows, "updated document");
        Ok(Outcome::from_rows(rows))
    }

    /// Removes the matching row.
    ///
    /// Collection memberships are left untouched; use
    /// [`crate::Library::remove_document`] to delete both atomically.
    pub fn delete(&self, id: DocumentId) -> Result<Outcome> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM pdf_catalog WHERE id = ?1", [id])?;

        tracing::debug!(%id, rows, "deleted document row");
        Ok(Outcome::from_rows(rows))
    }

    /// Returns every catalog row in insertion order.
    pub fn fetch_all(&self) -> Result<Vec<Document>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid"))?;
        let rows = stmt.query_map([], document_from_row)?;

        let mut documents = Vec::new();
        for row_result in rows {
            documents.push(row_result?);
        }
        Ok(documents)
    }

    /// Point lookup by id. Returns `None` when absent.
    pub fn get(&self, id: DocumentId) -> Result<Option<Document>> {
        let document = self
            .db
            .connection()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                [id],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    /// Returns the first document stored under `path`, if any.
    pub fn find_by_path(&self, path: &Path) -> Result<Option<Document>> {
        let document = self
            .db
            .connection()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE file_path = ?1 ORDER BY rowid LIMIT 1"),
                [path.to_string_lossy().into_owned()],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    /// Whether a row with this id exists.
    pub fn contains(&self, id: DocumentId) -> Result<bool> {
        let exists = self.db.connection().query_row(
            "SELECT EXISTS(SELECT 1 FROM pdf_catalog WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Number of rows in the catalog.
    pub fn count(&self) -> Result<usize> {
        let count: i64 =
            self.db
                .connection()
                .query_row("SELECT COUNT(*) FROM pdf_catalog", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn path_text(document: &Document) -> String {
    document.file_path().to_string_lossy().into_owned()
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    let id: DocumentId = row.get(0)?;
    let file_path: String = row.get(1)?;
    let metadata = DocumentMetadata {
        title: row.get(2)?,
        author: row.get(3)?,
        subject: row.get(4)?,
        keywords: row.get(5)?,
        creation_date: row.get(6)?,
        producer: row.get(7)?,
    };
    Ok(Document::new(id, PathBuf::from(file_path), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str) -> Document {
        Document::new(
            DocumentId::generate(),
            format!("/papers/{}.pdf", title.to_lowercase().replace(' ', "-")),
            DocumentMetadata {
                title: title.to_string(),
                author: "Grace Hopper".to_string(),
                subject: "Compilers".to_string(),
                keywords: "cobol, history".to_string(),
                creation_date: "Jan 5, 2024".to_string(),
                producer: "LaTeX".to_string(),
            },
        )
    }

    #[test]
    fn insert_then_fetch_all_returns_identical_fields() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = paper("Paper A");

        store.insert(&doc).unwrap();
        let all = store.fetch_all().unwrap();

        assert_eq!(all, vec![doc]);
    }

    #[test]
    fn insert_duplicate_id_is_rejected() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = paper("Paper A");
        store.insert(&doc).unwrap();

        let result = store.insert(&doc);

        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == doc.id()));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn update_is_a_full_overwrite() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = paper("Paper A");
        store.insert(&doc).unwrap();

        let replacement = Document::new(
            doc.id(),
            "/moved/paper-a.pdf",
            DocumentMetadata::default().with_title("Paper A, revised"),
        );
        let outcome = store.update(&replacement).unwrap();

        assert_eq!(outcome, Outcome::Changed);
        let stored = store.get(doc.id()).unwrap().unwrap();
        assert_eq!(stored, replacement);
        assert_eq!(stored.metadata().author, "", "old author should be discarded");
    }

    #[test]
    fn update_missing_row_is_unchanged() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);

        let outcome = store.update(&paper("Ghost")).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn delete_removes_row_and_reports_missing() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = paper("Paper A");
        store.insert(&doc).unwrap();

        assert_eq!(store.delete(doc.id()).unwrap(), Outcome::Changed);
        assert!(store.fetch_all().unwrap().is_empty());
        assert!(!store.contains(doc.id()).unwrap());
        assert_eq!(store.delete(doc.id()).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn fetch_all_preserves_insertion_order() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let docs: Vec<Document> = ["Zeta", "Alpha", "Mu"].iter().map(|t| paper(t)).collect();

        for doc in &docs {
            store.insert(doc).unwrap();
        }

        let titles: Vec<String> = store
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|d| d.metadata().title.clone())
            .collect();
        assert_eq!(titles, vec!["Zeta", "Alpha", "Mu"]);
    }

    #[test]
    fn find_by_path_matches_stored_file_path() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = paper("Paper A");
        store.insert(&doc).unwrap();

        assert_eq!(store.find_by_path(doc.file_path()).unwrap(), Some(doc));
        assert_eq!(store.find_by_path(Path::new("/elsewhere.pdf")).unwrap(), None);
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);

        assert_eq!(store.get(DocumentId::generate()).unwrap(), None);
    }

    #[test]
    fn empty_metadata_is_stored_as_empty_strings() {
        let db = Database::in_memory().unwrap();
        let store = DocumentStore::new(&db);
        let doc = Document::new(DocumentId::generate(), "/a.pdf", DocumentMetadata::default());
        store.insert(&doc).unwrap();

        let nulls: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM pdf_catalog
                 WHERE title IS NULL OR author IS NULL OR producer IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 0);
        assert_eq!(store.get(doc.id()).unwrap().unwrap().metadata(), &DocumentMetadata::default());
    }
}
