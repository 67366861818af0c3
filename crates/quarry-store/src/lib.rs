//! Quarry Storage Layer
//!
//! Persistence and read-side queries for structured concepts.
//!
//! # Architecture
//!
//! - [`JsonConceptStore`]: one directory per book, one pretty-printed JSON file
//!   per concept, plus a `book.json` describing the book. Append-only.
//! - [`MemoryStore`]: in-process store for tests and dry runs
//! - [`ConceptIndex`]: an explicit, rebuildable snapshot of everything under a
//!   store root, answering keyword search and browse queries
//!
//! # Examples
//!
//! ```no_run
//! use quarry_store::{BookInfo, ConceptIndex, JsonConceptStore};
//!
//! let book = BookInfo::new("kr_c", "The C Programming Language");
//! let store = JsonConceptStore::open("outputs", &book).unwrap();
//!
//! let index = ConceptIndex::build("outputs").unwrap();
//! for hit in index.search("pointer", None, 10) {
//!     println!("{} {}", hit.id, hit.topic);
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod index;
mod json_store;
mod memory;

pub use error::StoreError;
pub use index::{BookSummary, ConceptIndex, IndexedConcept, SearchHit};
pub use json_store::{BookInfo, JsonConceptStore, BOOK_METADATA_FILE};
pub use memory::MemoryStore;
