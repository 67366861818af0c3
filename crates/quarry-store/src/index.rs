//! Read-side index over a store root

use crate::json_store::{BookInfo, BOOK_METADATA_FILE};
use crate::StoreError;
use quarry_domain::{AtomicConcept, ConceptId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Characters of explanation shown in a search hit before truncation
const PREVIEW_CHARS: usize = 200;

/// A concept loaded into the index, with the book it came from
#[derive(Debug, Clone)]
pub struct IndexedConcept {
    /// Concept id (the file stem)
    pub id: ConceptId,
    /// Book id (the directory name)
    pub book: String,
    /// Book title, or the book id when no metadata exists
    pub book_title: String,
    /// File the concept was read from
    pub path: PathBuf,
    /// The concept itself
    pub concept: AtomicConcept,
    search_text: String,
}

/// One keyword search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Concept id
    pub id: ConceptId,
    /// Concept topic
    pub topic: String,
    /// Book id
    pub book: String,
    /// Book title
    pub book_title: String,
    /// Explanation, truncated with "..." past 200 characters
    pub explanation_preview: String,
    /// Syntax line (may be empty)
    pub syntax: String,
}

/// Per-book listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    /// Book metadata (synthesized from the directory name when absent)
    pub info: BookInfo,
    /// Number of indexed concepts from the book
    pub concept_count: usize,
}

/// Snapshot of every concept under a store root.
///
/// Nothing is loaded implicitly: [`ConceptIndex::build`] reads the tree once
/// and [`ConceptIndex::refresh`] re-reads it on demand.
#[derive(Debug, Clone)]
pub struct ConceptIndex {
    root: PathBuf,
    concepts: BTreeMap<String, IndexedConcept>,
    books: BTreeMap<String, BookInfo>,
}

impl ConceptIndex {
    /// Build an index from `root/<book>/*.json`
    ///
    /// A missing root yields an empty index. Unreadable concept files are
    /// skipped with a warning.
    pub fn build(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut index = Self {
            root: root.as_ref().to_path_buf(),
            concepts: BTreeMap::new(),
            books: BTreeMap::new(),
        };
        index.refresh()?;
        Ok(index)
    }

    /// Discard the snapshot and re-read the store root
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.concepts.clear();
        self.books.clear();

        if !self.root.is_dir() {
            info!(root = %self.root.display(), "Concept root does not exist, index is empty");
            return Ok(());
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let book_id = entry.file_name().to_string_lossy().into_owned();
            self.index_book(&book_id, &entry.path())?;
        }

        info!(
            concepts = self.concepts.len(),
            books = self.books.len(),
            "Built concept index"
        );
        Ok(())
    }

    fn index_book(&mut self, book_id: &str, dir: &Path) -> Result<(), StoreError> {
        let info = read_book_info(dir).unwrap_or_else(|| BookInfo::new(book_id, book_id));
        debug!(book = book_id, "Indexing book");

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let is_metadata = path.file_name().is_some_and(|name| name == BOOK_METADATA_FILE);
            if !is_json || is_metadata {
                continue;
            }

            let concept = match read_concept(&path) {
                Ok(concept) => concept,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to index concept file");
                    continue;
                }
            };

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let search_text = format!(
                "{} {} {}",
                concept.topic, concept.explanation, concept.syntax
            )
            .to_lowercase();

            self.concepts.insert(
                stem.clone(),
                IndexedConcept {
                    id: ConceptId::from_raw(stem),
                    book: book_id.to_string(),
                    book_title: info.title.clone(),
                    path,
                    concept,
                    search_text,
                },
            );
        }

        self.books.insert(book_id.to_string(), info);
        Ok(())
    }

    /// Root directory the index was built from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed concepts
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// True when no concepts are indexed
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Case-insensitive substring search over topic, explanation and syntax.
    ///
    /// Topic matches rank ahead of body-only matches; otherwise results keep
    /// id order. An empty query matches everything.
    pub fn search(&self, query: &str, book: Option<&str>, limit: usize) -> Vec<SearchHit> {
        let needle = query.to_lowercase();

        let mut matches: Vec<&IndexedConcept> = self
            .concepts
            .values()
            .filter(|c| book.is_none_or(|b| c.book == b))
            .filter(|c| c.search_text.contains(&needle))
            .collect();

        // Stable sort keeps id order within each group
        matches.sort_by_key(|c| !c.concept.topic.to_lowercase().contains(&needle));

        matches.into_iter().take(limit).map(to_hit).collect()
    }

    /// Full record for one concept
    pub fn get(&self, id: &str) -> Option<&IndexedConcept> {
        self.concepts.get(id)
    }

    /// Every known book with its concept count
    pub fn books(&self) -> Vec<BookSummary> {
        self.books
            .values()
            .map(|info| BookSummary {
                info: info.clone(),
                concept_count: self.concepts.values().filter(|c| c.book == info.id).count(),
            })
            .collect()
    }

    /// Concepts whose topic contains `topic`, across all books
    pub fn by_topic(&self, topic: &str, limit: usize) -> Vec<SearchHit> {
        let needle = topic.to_lowercase();
        self.concepts
            .values()
            .filter(|c| c.concept.topic.to_lowercase().contains(&needle))
            .take(limit)
            .map(to_hit)
            .collect()
    }
}

fn read_book_info(dir: &Path) -> Option<BookInfo> {
    let raw = fs::read_to_string(dir.join(BOOK_METADATA_FILE)).ok()?;
    match serde_json::from_str(&raw) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Ignoring malformed book metadata");
            None
        }
    }
}

fn read_concept(path: &Path) -> Result<AtomicConcept, StoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn to_hit(c: &IndexedConcept) -> SearchHit {
    let explanation = &c.concept.explanation;
    let explanation_preview = if explanation.chars().count() > PREVIEW_CHARS {
        let head: String = explanation.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        explanation.clone()
    };

    SearchHit {
        id: c.id.clone(),
        topic: c.concept.topic.clone(),
        book: c.book.clone(),
        book_title: c.book_title.clone(),
        explanation_preview,
        syntax: c.concept.syntax.clone(),
    }
}
