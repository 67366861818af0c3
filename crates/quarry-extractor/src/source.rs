//! Document sources
//!
//! [`PdfDocument`] extracts the text of a PDF page by page, once, when opened,
//! and serves pages from memory, so page numbers are the PDF's own.
//! [`TextDocument`] serves pre-extracted text where pages are separated by
//! form feeds, which is what `pdftotext` produces.

use std::fs;
use std::path::{Path, PathBuf};

use quarry_domain::traits::{DocumentSource, PageText};
use tracing::{debug, info};

use crate::error::SourceError;

/// Page separator in pre-extracted text
pub const PAGE_BREAK: char = '\x0C';

fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = if text.contains(PAGE_BREAK) {
        text.split(PAGE_BREAK).map(str::to_string).collect()
    } else {
        // No form feeds: fall back to runs of blank lines as page breaks
        text.split("\n\n\n").map(str::to_string).collect()
    };

    // A trailing separator does not open another page
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

fn window(pages: &[String], start: usize, count: usize) -> Vec<PageText> {
    pages
        .iter()
        .enumerate()
        .skip(start)
        .take(count)
        .map(|(idx, text)| PageText {
            number: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            text: text.clone(),
        })
        .collect()
}

/// In-memory paginated text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pages: Vec<String>,
}

impl TextDocument {
    /// Document with the given pages, first page first
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Split `text` into pages on form feeds
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::traits::DocumentSource;
    /// use quarry_extractor::TextDocument;
    ///
    /// let doc = TextDocument::from_text("page one\x0Cpage two\x0C");
    /// assert_eq!(doc.page_count(), 2);
    /// ```
    pub fn from_text(text: &str) -> Self {
        Self::new(split_pages(text))
    }

    /// Read a text file and split it into pages
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(Self::from_text(&text))
    }
}

impl DocumentSource for TextDocument {
    type Error = SourceError;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn read_pages(&mut self, start: usize, count: usize) -> Result<Vec<PageText>, Self::Error> {
        Ok(window(&self.pages, start, count))
    }
}

/// A PDF whose text has been extracted
#[derive(Debug, Clone)]
pub struct PdfDocument {
    path: PathBuf,
    pages: Vec<String>,
}

impl PdfDocument {
    /// Open `path` and extract the text of every page
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| SourceError::Pdf(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), pages = pages.len(), "Opened PDF");
        Ok(Self {
            path: path.to_path_buf(),
            pages,
        })
    }

    /// Path the document was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for PdfDocument {
    type Error = SourceError;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn read_pages(&mut self, start: usize, count: usize) -> Result<Vec<PageText>, Self::Error> {
        debug!(path = %self.path.display(), start, count, "Reading pages");
        Ok(window(&self.pages, start, count))
    }
}
