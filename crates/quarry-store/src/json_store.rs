//! Append-only JSON file store

use crate::StoreError;
use quarry_domain::traits::ConceptStore;
use quarry_domain::{AtomicConcept, ConceptId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Name of the per-book metadata file inside a book directory
pub const BOOK_METADATA_FILE: &str = "book.json";

/// Descriptive metadata for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    /// Short identifier; also the directory name and concept id prefix
    pub id: String,
    /// Full title
    pub title: String,
    /// Author line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// What the book's concepts focus on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl BookInfo {
    /// Metadata with just an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: None,
            focus: None,
        }
    }
}

/// Concept store writing one JSON file per concept under `root/<book id>/`
///
/// Files are written to a temporary file and moved into place without
/// clobbering, so a concept file is either absent or complete, and an id can
/// only ever be written once.
pub struct JsonConceptStore {
    dir: PathBuf,
}

impl JsonConceptStore {
    /// Open (creating if needed) the directory for `book` under `root` and
    /// record the book's metadata there
    pub fn open(root: impl AsRef<Path>, book: &BookInfo) -> Result<Self, StoreError> {
        if book.id.is_empty() || book.id.contains(['/', '\\']) || book.id.starts_with('.') {
            return Err(StoreError::InvalidData(format!(
                "Book id '{}' is not usable as a directory name",
                book.id
            )));
        }

        let dir = root.as_ref().join(&book.id);
        fs::create_dir_all(&dir)?;

        let store = Self { dir };
        store.write_metadata(book)?;
        Ok(store)
    }

    /// Directory holding this book's concepts
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a concept with `id` is (or would be) stored at
    pub fn concept_path(&self, id: &ConceptId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Read a stored concept back
    pub fn load(&self, id: &ConceptId) -> Result<AtomicConcept, StoreError> {
        let path = self.concept_path(id);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Io(e),
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_metadata(&self, book: &BookInfo) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, book)?;
        tmp.flush()?;
        tmp.persist(self.dir.join(BOOK_METADATA_FILE))
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl ConceptStore for JsonConceptStore {
    type Error = StoreError;

    fn persist(&mut self, id: &ConceptId, concept: &AtomicConcept) -> Result<(), Self::Error> {
        let path = self.concept_path(id);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, concept)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        tmp.persist_noclobber(&path).map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => StoreError::Duplicate(id.to_string()),
            _ => StoreError::Io(e.error),
        })?;

        debug!(id = %id, path = %path.display(), "Persisted concept");
        Ok(())
    }

    fn contains(&self, id: &ConceptId) -> Result<bool, Self::Error> {
        Ok(self.concept_path(id).try_exists()?)
    }
}
