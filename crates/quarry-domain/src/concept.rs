//! Atomic concepts - the structured records produced from candidates

use crate::candidate::PageSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of the topic slug inside a [`ConceptId`]
pub const SLUG_MAX_LEN: usize = 30;

/// Identifier a concept is persisted under: `{book}_{seq:03}_{slug}`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    /// Generate the id for the `sequence`-th concept of `book_id`
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::ConceptId;
    ///
    /// let id = ConceptId::generate("kr_c", 7, "The `for` Statement!");
    /// assert_eq!(id.as_str(), "kr_c_007_the_for_statement");
    /// ```
    pub fn generate(book_id: &str, sequence: u32, topic: &str) -> Self {
        let slug = match slugify(topic) {
            s if s.is_empty() => "unknown".to_string(),
            s => s,
        };
        Self(format!("{}_{:03}_{}", book_id, sequence, slug))
    }

    /// Wrap an existing id (e.g. a file stem read back from disk)
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sanitize a topic into a file-name-safe slug.
///
/// Drops everything but word characters, whitespace and hyphens, collapses
/// each run of whitespace/hyphens into one underscore, lowercases, and keeps
/// at most [`SLUG_MAX_LEN`] characters.
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut in_separator = false;

    for c in topic.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                slug.push('_');
                in_separator = true;
            }
        } else if c.is_alphanumeric() || c == '_' {
            slug.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    slug.chars().take(SLUG_MAX_LEN).collect()
}

/// Provenance recorded alongside every stored concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Title of the source book
    pub source: String,
    /// Pages the candidate was drawn from
    pub page_range: PageSpan,
    /// When the concept was structured (seconds since Unix epoch)
    pub extracted_at: u64,
    /// Candidate contained a code block
    pub has_code: bool,
    /// Candidate contained a text block
    pub has_explanation: bool,
    /// Subject area the structuring prompt was tuned for
    pub book_context: String,
}

/// One self-contained teachable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicConcept {
    /// Concept name
    pub topic: String,
    /// What it is and why it is used
    pub explanation: String,
    /// Generalized code pattern or technical specification
    #[serde(default)]
    pub syntax: String,
    /// Minimal example, one entry per line
    #[serde(default)]
    pub code_example: Vec<String>,
    /// How the example demonstrates the concept
    #[serde(default)]
    pub example_explanation: String,
    /// Provenance; absent until the structuring service attaches it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_metadata: Option<ExtractionMetadata>,
}

impl AtomicConcept {
    /// Code example joined into a single block of text
    pub fn code_text(&self) -> String {
        self.code_example.join("\n")
    }
}
