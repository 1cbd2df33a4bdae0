use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdfshelf::browse::{self, FolderEntry};
use pdfshelf::{
    Collection, CollectionFilter, CollectionId, Config, Document, DocumentId, DocumentMetadata,
    Library, MetadataKey, StoreError, WHOLE_LIBRARY_LABEL,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pdfshelf - catalog and organize a personal PDF library
#[derive(Parser)]
#[command(name = "pdfshelf")]
#[command(about = "Catalog PDF files and group them into collections")]
#[command(version)]
struct Cli {
    /// Log store activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// List the PDF files in a folder and whether they are already cataloged
    Browse {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Add a PDF to the library, pre-filling metadata from the file
    Add(AddCommand),

    /// List library documents, optionally filtered by collection
    List {
        /// Only show documents in this collection
        #[arg(short, long, value_name = "COLLECTION_ID")]
        collection: Option<CollectionId>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one document with its collections
    Show {
        #[arg(value_name = "ID")]
        id: DocumentId,

        #[arg(long)]
        json: bool,
    },

    /// Overwrite metadata fields or the file path of a document
    Update(UpdateCommand),

    /// Remove a document and its collection memberships
    Remove {
        #[arg(value_name = "ID")]
        id: DocumentId,
    },

    /// Manage collections
    #[command(subcommand)]
    Collection(CollectionCommand),

    /// Report memberships that point at missing documents or collections
    Check {
        /// Delete the dangling memberships that were found
        #[arg(long)]
        fix: bool,
    },
}

#[derive(Subcommand)]
enum CollectionCommand {
    /// Create a collection
    New {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// List collections
    List,
    /// Delete a collection and its memberships
    Delete {
        #[arg(value_name = "COLLECTION_ID")]
        id: CollectionId,
    },
    /// Put a document into a collection
    Link {
        #[arg(value_name = "COLLECTION_ID")]
        collection: CollectionId,
        #[arg(value_name = "DOCUMENT_ID")]
        document: DocumentId,
    },
    /// Take a document out of a collection
    Unlink {
        #[arg(value_name = "COLLECTION_ID")]
        collection: CollectionId,
        #[arg(value_name = "DOCUMENT_ID")]
        document: DocumentId,
    },
}

/// Metadata overrides shared by `add` and `update`.
#[derive(Args, Debug, Default)]
struct MetadataArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Set any field, e.g. `--set keywords=rust,pdf` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_metadata_pair)]
    fields: Vec<(MetadataKey, String)>,
}

impl MetadataArgs {
    fn apply(&self, metadata: &mut DocumentMetadata) {
        for (key, value) in &self.fields {
            metadata.set(*key, value.clone());
        }
        if let Some(title) = &self.title {
            metadata.set(MetadataKey::Title, title.clone());
        }
        if let Some(author) = &self.author {
            metadata.set(MetadataKey::Author, author.clone());
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.fields.is_empty()
    }
}

#[derive(Parser)]
struct AddCommand {
    /// The PDF file to add
    #[arg(value_name = "PATH")]
    path: PathBuf,

    #[command(flatten)]
    metadata: MetadataArgs,

    /// Collection to put the document in (repeatable)
    #[arg(short, long = "collection", value_name = "COLLECTION_ID")]
    collections: Vec<CollectionId>,
}

#[derive(Parser)]
struct UpdateCommand {
    #[arg(value_name = "ID")]
    id: DocumentId,

    #[command(flatten)]
    metadata: MetadataArgs,

    /// New location of the file
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "pdfshelf=debug"
    } else {
        "pdfshelf=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?;
    let library = config.open_library()?;
    let mut out = std::io::stdout().lock();
    execute(&cli.command, &library, &mut out)
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are the store's validation and lookup failures anywhere in
/// the context chain. Everything else is an internal error.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<StoreError>())
        .any(StoreError::is_user_error)
}

/// Dispatches a command against an open library.
///
/// Separated from `run` so commands can be tested with in-memory databases.
fn execute(command: &Commands, library: &Library, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Browse { dir } => execute_browse(library, dir, out),
        Commands::Add(cmd) => execute_add(library, cmd, out),
        Commands::List { collection, json } => execute_list(library, *collection, *json, out),
        Commands::Show { id, json } => execute_show(library, *id, *json, out),
        Commands::Update(cmd) => execute_update(library, cmd, out),
        Commands::Remove { id } => {
            let detached = library.remove_document(*id)?;
            writeln!(out, "Removed document {id} ({detached} memberships)")?;
            Ok(())
        }
        Commands::Collection(cmd) => execute_collection(library, cmd, out),
        Commands::Check { fix } => execute_check(library, *fix, out),
    }
}

fn execute_browse(library: &Library, dir: &Path, out: &mut impl Write) -> Result<()> {
    let entries = browse::list_pdf_files(dir);
    if entries.is_empty() {
        writeln!(out, "No PDF files in {}", dir.display())?;
        return Ok(());
    }

    for entry in entries {
        let path = absolute_path(&entry.path);
        if let Some(existing) = library.documents().find_by_path(&path)? {
            writeln!(out, "* {}  {}  {}", existing.id(), entry.file_name(), existing.display_name())?;
            continue;
        }

        // Uncataloged files get their id when added, so none is printed here.
        let entry = FolderEntry { path, ..entry };
        match entry.preview() {
            Some(document) => {
                writeln!(out, "  {}  {}", entry.file_name(), document.display_name())?
            }
            None => writeln!(out, "  {}  (unreadable)", entry.file_name())?,
        }
    }
    Ok(())
}

fn execute_add(library: &Library, cmd: &AddCommand, out: &mut impl Write) -> Result<()> {
    let path = std::fs::canonicalize(&cmd.path).map_err(|_| {
        StoreError::InvalidInput(format!("file not found: {}", cmd.path.display()))
    })?;

    if let Some(existing) = library.documents().find_by_path(&path)? {
        return Err(StoreError::InvalidInput(format!(
            "{} is already in the library as {}",
            path.display(),
            existing.id()
        ))
        .into());
    }

    let entry = FolderEntry::new(path);
    let mut document = entry.preview().ok_or_else(|| {
        StoreError::InvalidInput(format!("{} is not a readable PDF", entry.path.display()))
    })?;

    let metadata = document.metadata_mut();
    cmd.metadata.apply(metadata);
    // Files without an embedded title fall back to their file stem.
    if metadata.title.trim().is_empty()
        && let Some(stem) = entry.path.file_stem()
    {
        metadata.title = stem.to_string_lossy().into_owned();
    }

    library
        .add_document(&document, &cmd.collections)
        .context("Failed to add document")?;

    write!(out, "Added \"{}\" (id: {})", document.display_name(), document.id())?;
    if !cmd.collections.is_empty() {
        write!(out, " to {} collection(s)", cmd.collections.len())?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute_list(
    library: &Library,
    collection: Option<CollectionId>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let filter = CollectionFilter::from_option(collection);
    if let Some(id) = filter.collection_id()
        && library.collections().get(id)?.is_none()
    {
        return Err(StoreError::CollectionNotFound(id).into());
    }

    let documents = library.displayed_documents(filter)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &documents)?;
        writeln!(out)?;
        return Ok(());
    }

    if documents.is_empty() {
        writeln!(out, "No documents.")?;
        return Ok(());
    }
    for document in &documents {
        let meta = document.metadata();
        writeln!(
            out,
            "{}  {}  {}  {}",
            document.id(),
            document.display_name(),
            meta.author,
            meta.creation_date
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct DocumentDetails<'a> {
    #[serde(flatten)]
    document: &'a Document,
    collections: &'a [Collection],
}

fn execute_show(library: &Library, id: DocumentId, json: bool, out: &mut impl Write) -> Result<()> {
    let document = library
        .documents()
        .get(id)?
        .ok_or(StoreError::DocumentNotFound(id))?;
    let collections = library.collections_for_document(id)?;

    if json {
        let details = DocumentDetails {
            document: &document,
            collections: &collections,
        };
        serde_json::to_writer_pretty(&mut *out, &details)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Id: {}", document.id())?;
    writeln!(out, "File: {}", document.file_path().display())?;
    for key in MetadataKey::ALL {
        writeln!(out, "{key}: {}", document.metadata().get(key))?;
    }
    let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
    writeln!(out, "Collections: {}", names.join(", "))?;
    Ok(())
}

fn execute_update(library: &Library, cmd: &UpdateCommand, out: &mut impl Write) -> Result<()> {
    if cmd.metadata.is_empty() && cmd.path.is_none() {
        return Err(StoreError::InvalidInput("nothing to update".to_string()).into());
    }

    let mut document = library
        .documents()
        .get(cmd.id)?
        .ok_or(StoreError::DocumentNotFound(cmd.id))?;
    cmd.metadata.apply(document.metadata_mut());
    if let Some(path) = &cmd.path {
        document.set_file_path(absolute_path(path));
    }

    library
        .update_document(&document)
        .context("Failed to update document")?;
    writeln!(out, "Updated \"{}\"", document.display_name())?;
    Ok(())
}

fn execute_collection(
    library: &Library,
    cmd: &CollectionCommand,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        CollectionCommand::New { name } => {
            let collection = library.create_collection(name)?;
            writeln!(out, "Created collection \"{}\" (id: {})", collection.name, collection.id)?;
        }
        CollectionCommand::List => {
            let documents = library.documents().count()?;
            writeln!(out, "{WHOLE_LIBRARY_LABEL} ({documents} documents)")?;
            for collection in library.list_collections()? {
                writeln!(out, "{}  {}", collection.id, collection.name)?;
            }
        }
        CollectionCommand::Delete { id } => {
            let detached = library.delete_collection(*id)?;
            writeln!(out, "Deleted collection {id} ({detached} memberships)")?;
        }
        CollectionCommand::Link {
            collection,
            document,
        } => {
            ensure_exists(library, *document, *collection)?;
            let outcome = library.link(*document, *collection)?;
            if outcome.is_changed() {
                writeln!(out, "Linked {document} to {collection}")?;
            } else {
                writeln!(out, "Already linked")?;
            }
        }
        CollectionCommand::Unlink {
            collection,
            document,
        } => {
            if library.unlink(*document, *collection)?.is_changed() {
                writeln!(out, "Unlinked {document} from {collection}")?;
            } else {
                writeln!(out, "Not linked")?;
            }
        }
    }
    Ok(())
}

fn execute_check(library: &Library, fix: bool, out: &mut impl Write) -> Result<()> {
    let dangling = library.check_integrity()?;
    if dangling == 0 {
        writeln!(out, "No dangling memberships")?;
        return Ok(());
    }

    if fix {
        let pruned = library.prune_dangling()?;
        writeln!(out, "Removed {pruned} dangling memberships")?;
    } else {
        writeln!(out, "Found {dangling} dangling memberships (run with --fix to remove)")?;
    }
    Ok(())
}

/// The command line links by id, so both sides must exist first.
fn ensure_exists(library: &Library, document: DocumentId, collection: CollectionId) -> Result<()> {
    if !library.documents().contains(document)? {
        return Err(StoreError::DocumentNotFound(document).into());
    }
    if library.collections().get(collection)?.is_none() {
        return Err(StoreError::CollectionNotFound(collection).into());
    }
    Ok(())
}

fn absolute_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Parses a `KEY=VALUE` metadata assignment.
///
/// Keys are the document information names, matched without regard to case.
/// The value may be empty, which clears the field.
fn parse_metadata_pair(input: &str) -> std::result::Result<(MetadataKey, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{input}`"))?;
    let key: MetadataKey = key.trim().parse()?;
    Ok((key, value.to_string()))
}
