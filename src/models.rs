mod collection;
mod document;
mod ids;
mod metadata;
mod outcome;

pub use collection::{Collection, CollectionFilter, WHOLE_LIBRARY_LABEL};
pub use document::Document;
pub use ids::{CollectionId, DocumentId};
pub use metadata::{DocumentMetadata, MetadataKey, MetadataMap};
pub use outcome::Outcome;
