use serde::{Deserialize, Serialize};

use super::CollectionId;

/// Label of the in-memory pseudo-collection that stands for the whole library.
pub const WHOLE_LIBRARY_LABEL: &str = "My Library";

/// A named, user-defined grouping of library documents.
///
/// Names are not unique; two collections may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
}

impl Collection {
    pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// What the library panel is filtered by.
///
/// `WholeLibrary` is never persisted and means "no filter".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFilter {
    #[default]
    WholeLibrary,
    Collection(CollectionId),
}

impl CollectionFilter {
    /// Builds a filter from an optional collection id; `None` is the whole library.
    pub fn from_option(id: Option<CollectionId>) -> Self {
        id.map_or(CollectionFilter::WholeLibrary, CollectionFilter::Collection)
    }

    /// Returns the collection id, if this filter names one.
    pub fn collection_id(self) -> Option<CollectionId> {
        match self {
            CollectionFilter::WholeLibrary => None,
            CollectionFilter::Collection(id) => Some(id),
        }
    }
}

impl From<CollectionId> for CollectionFilter {
    fn from(id: CollectionId) -> Self {
        CollectionFilter::Collection(id)
    }
}
