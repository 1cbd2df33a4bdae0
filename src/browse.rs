//! Folder browsing: finds PDF files in a directory that may not be in the library.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Document, DocumentId, DocumentMetadata, pdf};

/// A PDF found in a browsed folder.
///
/// Each entry receives a fresh [`DocumentId`] when listed; that id becomes the
/// catalog id if the file is added to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub id: DocumentId,
    pub path: PathBuf,
}

impl FolderEntry {
    /// Creates an entry for `path` with a freshly generated id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: DocumentId::generate(),
            path: path.into(),
        }
    }

    /// The file name component of the path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Opens the file and builds an un-cataloged document from its metadata.
    ///
    /// Returns `None` if the file is not a readable PDF.
    pub fn preview(&self) -> Option<Document> {
        let metadata = pdf::preview(&self.path)?;
        Some(Document::new(
            self.id,
            self.path.clone(),
            DocumentMetadata::from_map(&metadata),
        ))
    }
}

/// Whether the path has a `.pdf` extension, ignoring case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}

/// Lists the PDF files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. An unreadable directory is logged
/// and yields an empty list.
pub fn list_pdf_files(dir: impl AsRef<Path>) -> Vec<FolderEntry> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot read folder");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_pdf(path))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths.into_iter().map(FolderEntry::new).collect()
}
