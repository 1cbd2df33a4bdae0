/// Base tables for the catalog, collections and their link table.
///
/// Uses CREATE TABLE IF NOT EXISTS so that a catalog created by an earlier
/// release (same table names, no version table) is adopted in place.
/// No foreign keys: membership cleanup is done explicitly inside transactions.
pub const INITIAL_SCHEMA: &str = r#"
-- One row per PDF in the library
CREATE TABLE IF NOT EXISTS pdf_catalog (
    id TEXT PRIMARY KEY NOT NULL,
    file_path TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    subject TEXT NOT NULL DEFAULT '',
    keywords TEXT NOT NULL DEFAULT '',
    creation_date TEXT NOT NULL DEFAULT '',
    producer TEXT NOT NULL DEFAULT ''
);

-- User-defined collections; names are not unique
CREATE TABLE IF NOT EXISTS collections (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL
);

-- Junction table: links documents to collections (many-to-many)
CREATE TABLE IF NOT EXISTS collection_links (
    pdf_id TEXT NOT NULL,
    collection_id TEXT NOT NULL
);
"#;

/// Normalizes identifiers, removes duplicate links and adds link indexes.
///
/// Older catalogs stored uppercase UUID strings and allowed the same
/// (document, collection) pair more than once.
pub const LINK_INTEGRITY: &str = r#"
UPDATE pdf_catalog SET id = lower(id) WHERE id <> lower(id);
UPDATE collections SET id = lower(id) WHERE id <> lower(id);
UPDATE collection_links
   SET pdf_id = lower(pdf_id), collection_id = lower(collection_id)
 WHERE pdf_id <> lower(pdf_id) OR collection_id <> lower(collection_id);

DELETE FROM collection_links
 WHERE rowid NOT IN (
     SELECT MIN(rowid) FROM collection_links GROUP BY pdf_id, collection_id
 );

-- Pair uniqueness; also serves lookups by pdf_id
CREATE UNIQUE INDEX IF NOT EXISTS idx_collection_links_pair
    ON collection_links(pdf_id, collection_id);

-- Lookups by collection
CREATE INDEX IF NOT EXISTS idx_collection_links_collection
    ON collection_links(collection_id);
"#;
