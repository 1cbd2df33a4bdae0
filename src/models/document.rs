use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DocumentId, DocumentMetadata};

/// A PDF known to the library, or previewed from a browsed folder.
///
/// Values handed out by the stores are owned copies; editing one never
/// touches the catalog until it is written back with an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    file_path: PathBuf,
    metadata: DocumentMetadata,
}

impl Document {
    /// Creates a document value from its parts.
    pub fn new(id: DocumentId, file_path: impl Into<PathBuf>, metadata: DocumentMetadata) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            metadata,
        }
    }

    /// Returns the document's identifier.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the path of the PDF on disk. May be stale if the file moved.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the metadata fields.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Returns the metadata fields for editing.
    pub fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        &mut self.metadata
    }

    /// Replaces the file path.
    pub fn set_file_path(&mut self, file_path: impl Into<PathBuf>) {
        self.file_path = file_path.into();
    }

    /// Name shown in lists: the title when present, otherwise the file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfshelf::{Document, DocumentId, DocumentMetadata};
    ///
    /// let untitled = Document::new(DocumentId::generate(), "/papers/a.pdf", DocumentMetadata::default());
    /// assert_eq!(untitled.display_name(), "a.pdf");
    ///
    /// let titled = Document::new(
    ///     DocumentId::generate(),
    ///     "/papers/a.pdf",
    ///     DocumentMetadata::default().with_title("Paper A"),
    /// );
    /// assert_eq!(titled.display_name(), "Paper A");
    /// ```
    pub fn display_name(&self) -> String {
        let title = self.metadata.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }
}
