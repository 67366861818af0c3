//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction core and its
//! collaborators. Implementations live in other crates.

use crate::{AtomicConcept, ConceptCandidate, ConceptId, PageSpan};

/// Raw text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    /// Extracted text, possibly empty
    pub text: String,
}

/// A paginated document the extractor reads from
///
/// Acquisition happens when the implementation is constructed (e.g. opening a
/// file) and release happens on drop, so a source is always released no matter
/// how a session ends.
///
/// Implemented by the extractor's `PdfDocument` and `TextDocument`
pub trait DocumentSource {
    /// Error type for read operations
    type Error;

    /// Total number of pages in the document
    fn page_count(&self) -> usize;

    /// Read up to `count` pages starting at 0-based page index `start`.
    ///
    /// Reading past the end yields fewer (possibly zero) pages, not an error.
    fn read_pages(&mut self, start: usize, count: usize) -> Result<Vec<PageText>, Self::Error>;
}

/// Everything the structuring service needs to know about one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringRequest {
    /// Candidate text, lines joined by newlines
    pub raw_content: String,
    /// Title of the book being processed
    pub source_title: String,
    /// Pages the candidate spans
    pub page_range: PageSpan,
    /// Candidate contained a code block
    pub has_code: bool,
    /// Candidate contained a text block
    pub has_explanation: bool,
}

impl StructuringRequest {
    /// Describe `candidate` from the book titled `source_title`
    pub fn from_candidate(candidate: &ConceptCandidate, source_title: impl Into<String>) -> Self {
        Self {
            raw_content: candidate.raw_content(),
            source_title: source_title.into(),
            page_range: candidate.page_span(),
            has_code: candidate.has_code(),
            has_explanation: candidate.has_explanation(),
        }
    }
}

/// Turns a concept candidate into a structured concept record
///
/// Implemented by the application layer (quarry-extractor, LLM-backed)
pub trait StructuringService {
    /// Error type for structuring operations
    type Error;

    /// Structure one candidate.
    ///
    /// `Ok(None)` is the explicit "nothing usable" signal; errors are reserved
    /// for failures talking to the underlying service.
    fn structure(&self, request: &StructuringRequest) -> Result<Option<AtomicConcept>, Self::Error>;
}

/// Append-only persistence of structured concepts
///
/// Implemented by the infrastructure layer (quarry-store)
pub trait ConceptStore {
    /// Error type for store operations
    type Error;

    /// Persist a new concept under `id`; existing ids are never overwritten
    fn persist(&mut self, id: &ConceptId, concept: &AtomicConcept) -> Result<(), Self::Error>;

    /// Whether a concept with `id` has already been persisted
    fn contains(&self, id: &ConceptId) -> Result<bool, Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (quarry-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model behind this provider, for logging
    fn model_name(&self) -> &str {
        "llm"
    }
}
