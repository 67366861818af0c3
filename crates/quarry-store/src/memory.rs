//! In-memory concept store

use crate::StoreError;
use quarry_domain::traits::ConceptStore;
use quarry_domain::{AtomicConcept, ConceptId};
use std::collections::BTreeMap;

/// Concept store that keeps everything in a map
///
/// Same append-only contract as the JSON store: persisting an existing id is
/// rejected with [`StoreError::Duplicate`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    concepts: BTreeMap<ConceptId, AtomicConcept>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored concept
    pub fn get(&self, id: &ConceptId) -> Option<&AtomicConcept> {
        self.concepts.get(id)
    }

    /// Number of stored concepts
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Stored ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &ConceptId> {
        self.concepts.keys()
    }
}

impl ConceptStore for MemoryStore {
    type Error = StoreError;

    fn persist(&mut self, id: &ConceptId, concept: &AtomicConcept) -> Result<(), Self::Error> {
        if self.concepts.contains_key(id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        self.concepts.insert(id.clone(), concept.clone());
        Ok(())
    }

    fn contains(&self, id: &ConceptId) -> Result<bool, Self::Error> {
        Ok(self.concepts.contains_key(id))
    }
}
