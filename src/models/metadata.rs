use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six document attributes the library understands.
///
/// `as_str` returns the key used in a PDF's document information dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetadataKey {
    Title,
    Author,
    Subject,
    Keywords,
    CreationDate,
    Producer,
}

impl MetadataKey {
    /// All keys, in display order.
    pub const ALL: [MetadataKey; 6] = [
        MetadataKey::Title,
        MetadataKey::Author,
        MetadataKey::Subject,
        MetadataKey::Keywords,
        MetadataKey::CreationDate,
        MetadataKey::Producer,
    ];

    /// Returns the information dictionary key name.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Title => "Title",
            MetadataKey::Author => "Author",
            MetadataKey::Subject => "Subject",
            MetadataKey::Keywords => "Keywords",
            MetadataKey::CreationDate => "CreationDate",
            MetadataKey::Producer => "Producer",
        }
    }

    /// Whether the underlying PDF attribute is a date.
    pub fn is_date(self) -> bool {
        matches!(self, MetadataKey::CreationDate)
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetadataKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown metadata key: {s}"))
    }
}

/// Sparse key/value view of document metadata; absent keys are omitted.
pub type MetadataMap = BTreeMap<MetadataKey, String>;

/// The six free-text metadata fields stored for every catalog row.
///
/// Every field is an empty string when absent, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub creation_date: String,
    pub producer: String,
}

impl DocumentMetadata {
    /// Builds metadata from a sparse map, filling missing keys with "".
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfshelf::{DocumentMetadata, MetadataKey, MetadataMap};
    ///
    /// let mut map = MetadataMap::new();
    /// map.insert(MetadataKey::Title, "Paper A".to_string());
    ///
    /// let meta = DocumentMetadata::from_map(&map);
    /// assert_eq!(meta.title, "Paper A");
    /// assert_eq!(meta.author, "");
    /// ```
    pub fn from_map(map: &MetadataMap) -> Self {
        let mut meta = Self::default();
        for (key, value) in map {
            meta.set(*key, value.clone());
        }
        meta
    }

    /// Returns the non-empty fields as a sparse map.
    pub fn to_map(&self) -> MetadataMap {
        MetadataKey::ALL
            .into_iter()
            .filter(|key| !self.get(*key).is_empty())
            .map(|key| (key, self.get(key).to_string()))
            .collect()
    }

    /// Returns the value for a key.
    pub fn get(&self, key: MetadataKey) -> &str {
        match key {
            MetadataKey::Title => &self.title,
            MetadataKey::Author => &self.author,
            MetadataKey::Subject => &self.subject,
            MetadataKey::Keywords => &self.keywords,
            MetadataKey::CreationDate => &self.creation_date,
            MetadataKey::Producer => &self.producer,
        }
    }

    /// Replaces the value for a key.
    pub fn set(&mut self, key: MetadataKey, value: impl Into<String>) {
        let slot = match key {
            MetadataKey::Title => &mut self.title,
            MetadataKey::Author => &mut self.author,
            MetadataKey::Subject => &mut self.subject,
            MetadataKey::Keywords => &mut self.keywords,
            MetadataKey::CreationDate => &mut self.creation_date,
            MetadataKey::Producer => &mut self.producer,
        };
        *slot = value.into();
    }

    /// Sets the title, builder style.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the author, builder style.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}
