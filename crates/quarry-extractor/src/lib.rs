//! Quarry Extractor
//!
//! Mines atomic programming concepts from technical books, one bounded,
//! resumable session at a time.
//!
//! # Overview
//!
//! Each session reads a window of pages after the last checkpoint, splits
//! them into typed content blocks, groups the blocks into concept
//! candidates, asks a structuring service (normally an LLM) to turn each
//! candidate into an [`AtomicConcept`](quarry_domain::AtomicConcept), and
//! persists the accepted concepts. Progress is checkpointed once per session
//! so a run can be interrupted at any point and resumed later.
//!
//! # Architecture
//!
//! ```text
//! DocumentSource → ContentClassifier → BoundaryDetector
//!       → StructuringService → ConceptStore
//!       → ProgressTracker (checkpoint)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use quarry_extractor::{
//!     BookTarget, ExtractorConfig, LlmStructurer, ProgressTracker, SessionController,
//!     TextDocument,
//! };
//! use quarry_llm::MockProvider;
//! use quarry_store::MemoryStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut document = TextDocument::from_file("kr.txt")?;
//! let structurer = LlmStructurer::new(MockProvider::new("{}"));
//! let tracker = ProgressTracker::load("kr.progress.json");
//!
//! let mut controller = SessionController::new(
//!     BookTarget::new("kr", "The C Programming Language"),
//!     structurer,
//!     MemoryStore::new(),
//!     tracker,
//!     ExtractorConfig::default(),
//! )?;
//!
//! let outcome = controller.run_session(&mut document)?;
//! println!("Complete: {}", outcome.is_complete());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod boundary;
pub mod classifier;
mod config;
mod context;
mod error;
mod parser;
mod progress;
mod prompt;
mod session;
mod source;
mod structurer;
mod validator;

#[cfg(test)]
mod tests;

pub use boundary::{detect_concepts, BoundaryDetector};
pub use classifier::{classify_page, ContentClassifier};
pub use config::{AdvancePolicy, ExtractorConfig};
pub use context::BookContext;
pub use error::{ExtractorError, ProgressError, SourceError};
pub use parser::parse_concept_response;
pub use progress::{ProgressTracker, SessionInfo, SessionRecord, SessionState};
pub use prompt::PromptBuilder;
pub use session::{
    next_checkpoint, BookTarget, CandidateFailure, FailureReason, SessionController,
    SessionOutcome, SessionReport,
};
pub use source::{PdfDocument, TextDocument, PAGE_BREAK};
pub use structurer::LlmStructurer;
pub use validator::{QualityValidator, RejectionReason, ValidationResult};
