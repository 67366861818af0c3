//! Quarry Domain Layer
//!
//! Core data model for extracting atomic programming concepts from technical
//! books. This crate holds only value types and the trait seams that the
//! infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Content block**: a run of same-kind lines (header, code, text) on one page
//! - **Concept candidate**: a run of blocks judged to form one teachable unit
//! - **Atomic concept**: the structured record (topic, explanation, syntax,
//!   example, example explanation) produced from a candidate
//! - **Concept id**: `{book}_{seq}_{slug}`, the key a concept is persisted under
//!
//! ## Architecture
//!
//! - No infrastructure code lives here
//! - Document sources, LLMs, structuring services and stores are traits
//!   (see [`traits`]) implemented by other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod candidate;
pub mod concept;
pub mod traits;

// Re-exports for convenience
pub use block::{BlockKind, ContentBlock};
pub use candidate::{ConceptCandidate, PageSpan};
pub use concept::{AtomicConcept, ConceptId, ExtractionMetadata};
