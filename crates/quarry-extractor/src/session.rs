//! Extraction session controller
//!
//! One session reads a window of pages after the last checkpoint, classifies
//! them, groups blocks into candidates, structures up to a capped number of
//! candidates and persists the accepted concepts. Progress is checkpointed
//! once, at the end. Failures of individual candidates are recorded in the
//! [`SessionReport`] and never abort the session; only a failure to read the
//! document or to write the checkpoint does.

use std::fmt::{self, Display};

use quarry_domain::traits::{ConceptStore, DocumentSource, StructuringRequest, StructuringService};
use quarry_domain::{BlockKind, ConceptCandidate, ConceptId, ContentBlock, PageSpan};
use tracing::{info, warn};

use crate::boundary::BoundaryDetector;
use crate::classifier::{is_chapter_heading, ContentClassifier};
use crate::config::{AdvancePolicy, ExtractorConfig};
use crate::error::ExtractorError;
use crate::progress::{ProgressTracker, SessionInfo, SessionState};

/// The book a controller extracts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTarget {
    /// Identifier used as the concept id prefix
    pub id: String,
    /// Human-readable title sent to the structuring service
    pub title: String,
}

impl BookTarget {
    /// Create a book target
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Why a candidate produced no concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The structuring service returned nothing usable
    Unusable,
    /// The structuring service failed
    Service(String),
    /// The concept could not be persisted
    Store(String),
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Unusable => f.write_str("no usable concept"),
            FailureReason::Service(e) => write!(f, "structuring failed: {}", e),
            FailureReason::Store(e) => write!(f, "store failed: {}", e),
        }
    }
}

/// A candidate that was attempted but produced no stored concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    /// Position of the candidate in the window
    pub index: usize,
    /// Pages the candidate spans
    pub pages: PageSpan,
    /// What went wrong
    pub reason: FailureReason,
}

/// Summary of one completed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Pages covered by the session, from the first page after the previous
    /// checkpoint to the new checkpoint
    pub pages: PageSpan,
    /// Checkpoint after the session
    pub last_processed_page: u32,
    /// Candidates detected in the window
    pub candidates_detected: usize,
    /// Candidates sent to the structuring service
    pub candidates_attempted: usize,
    /// Ids of the concepts persisted, in order
    pub stored: Vec<ConceptId>,
    /// Attempted candidates that yielded nothing
    pub failures: Vec<CandidateFailure>,
    /// Concepts persisted over all sessions
    pub total_concepts_extracted: u32,
}

impl SessionReport {
    /// Concepts persisted in this session
    pub fn concepts_extracted(&self) -> usize {
        self.stored.len()
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A window was processed and checkpointed
    Progressed(SessionReport),
    /// Nothing left to read after the checkpoint; state is unchanged
    Complete {
        /// Checkpoint the document was exhausted at
        last_processed_page: u32,
    },
}

impl SessionOutcome {
    /// Whether the document is exhausted
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionOutcome::Complete { .. })
    }
}

/// Runs extraction sessions for one book
pub struct SessionController<S, C> {
    book: BookTarget,
    structurer: S,
    store: C,
    tracker: ProgressTracker,
    config: ExtractorConfig,
    classifier: ContentClassifier,
    detector: BoundaryDetector,
}

impl<S, C> SessionController<S, C>
where
    S: StructuringService,
    S::Error: Display,
    C: ConceptStore,
    C::Error: Display,
{
    /// Create a controller, validating `config`
    pub fn new(
        book: BookTarget,
        structurer: S,
        store: C,
        tracker: ProgressTracker,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            book,
            structurer,
            store,
            tracker,
            classifier: ContentClassifier::new(config.min_page_chars),
            detector: BoundaryDetector::default(),
            config,
        })
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    /// The concept store
    pub fn store(&self) -> &C {
        &self.store
    }

    /// The structuring service
    pub fn structurer(&self) -> &S {
        &self.structurer
    }

    /// The book being extracted
    pub fn book(&self) -> &BookTarget {
        &self.book
    }

    /// Run one session against `source`
    pub fn run_session<D>(&mut self, source: &mut D) -> Result<SessionOutcome, ExtractorError>
    where
        D: DocumentSource,
        D::Error: Display,
    {
        let start = self.tracker.state().last_processed_page;
        let pages = source
            .read_pages(start as usize, self.config.window_size)
            .map_err(|e| ExtractorError::Source(e.to_string()))?;

        let blocks = self.classifier.classify_pages(&pages);
        if blocks.is_empty() {
            info!(book = %self.book.id, last_processed_page = start, "Extraction complete");
            return Ok(SessionOutcome::Complete {
                last_processed_page: start,
            });
        }

        let chapter = chapter_label(&blocks);
        let candidates = self.detector.detect(blocks);
        let attempted = candidates.len().min(self.config.max_concepts_per_session);
        info!(
            book = %self.book.id,
            start_page = start + 1,
            detected = candidates.len(),
            attempted,
            "Processing window"
        );

        let base_total = self.tracker.state().total_concepts_extracted;
        let mut stored = Vec::new();
        let mut failures = Vec::new();

        for (index, candidate) in candidates.iter().take(attempted).enumerate() {
            let sequence = base_total.saturating_add(stored.len() as u32 + 1);
            match self.process_candidate(candidate, sequence) {
                Ok(id) => stored.push(id),
                Err(reason) => {
                    warn!(
                        book = %self.book.id,
                        candidate = index,
                        pages = %candidate.page_span(),
                        %reason,
                        "Candidate skipped"
                    );
                    failures.push(CandidateFailure {
                        index,
                        pages: candidate.page_span(),
                        reason,
                    });
                }
            }
        }

        let new_last = next_checkpoint(start, &candidates, attempted, self.config.advance_policy);
        let covered = PageSpan::new(start + 1, new_last.max(start + 1));
        let state = self.tracker.update(
            new_last,
            stored.len() as u32,
            SessionInfo {
                page_range: covered,
                chapter,
            },
        )?;

        Ok(SessionOutcome::Progressed(SessionReport {
            pages: covered,
            last_processed_page: state.last_processed_page,
            candidates_detected: candidates.len(),
            candidates_attempted: attempted,
            stored,
            failures,
            total_concepts_extracted: state.total_concepts_extracted,
        }))
    }

    /// Run sessions until the document is exhausted or `max_sessions` have run
    pub fn run_sessions<D>(
        &mut self,
        source: &mut D,
        max_sessions: usize,
    ) -> Result<Vec<SessionOutcome>, ExtractorError>
    where
        D: DocumentSource,
        D::Error: Display,
    {
        let mut outcomes = Vec::new();
        for _ in 0..max_sessions {
            let outcome = self.run_session(source)?;
            let done = outcome.is_complete();
            outcomes.push(outcome);
            if done {
                break;
            }
        }
        Ok(outcomes)
    }

    fn process_candidate(
        &mut self,
        candidate: &ConceptCandidate,
        sequence: u32,
    ) -> Result<ConceptId, FailureReason> {
        let request = StructuringRequest::from_candidate(candidate, self.book.title.as_str());
        let concept = self
            .structurer
            .structure(&request)
            .map_err(|e| FailureReason::Service(e.to_string()))?
            .ok_or(FailureReason::Unusable)?;

        let id = ConceptId::generate(&self.book.id, sequence, &concept.topic);

        // A session killed before its checkpoint leaves its concepts behind;
        // the rerun produces the same ids for them
        let already_stored = self
            .store
            .contains(&id)
            .map_err(|e| FailureReason::Store(e.to_string()))?;
        if already_stored {
            info!(id = %id, "Concept already stored by an interrupted session");
            return Ok(id);
        }

        self.store
            .persist(&id, &concept)
            .map_err(|e| FailureReason::Store(e.to_string()))?;

        info!(id = %id, topic = %concept.topic, "Concept stored");
        Ok(id)
    }
}

/// First chapter heading among the window's header blocks
fn chapter_label(blocks: &[ContentBlock]) -> Option<String> {
    blocks
        .iter()
        .filter(|b| b.kind() == BlockKind::Header)
        .flat_map(|b| b.lines())
        .find(|line| is_chapter_heading(line))
        .cloned()
}

/// Page the checkpoint moves to after a window starting after `start`
pub fn next_checkpoint(
    start: u32,
    candidates: &[ConceptCandidate],
    attempted: usize,
    policy: AdvancePolicy,
) -> u32 {
    let all_detected = candidates
        .iter()
        .map(ConceptCandidate::max_page)
        .max()
        .unwrap_or(start)
        .max(start);

    match policy {
        AdvancePolicy::AllDetected => all_detected,
        AdvancePolicy::Attempted => {
            let attempted_last = candidates[..attempted.min(candidates.len())]
                .iter()
                .map(ConceptCandidate::max_page)
                .max()
                .unwrap_or(start)
                .max(start);

            match candidates.get(attempted) {
                // Stop just before the first skipped candidate, but never
                // before the last page an attempted candidate drew from
                Some(next) => {
                    let checkpoint = next.page_span().first.saturating_sub(1).max(attempted_last);
                    if checkpoint > start {
                        checkpoint
                    } else {
                        all_detected
                    }
                }
                None => all_detected,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(first: u32, last: u32) -> ConceptCandidate {
        let blocks = vec![
            ContentBlock::new(BlockKind::Text, first, "text"),
            ContentBlock::new(BlockKind::Code, last, "code;"),
        ];
        ConceptCandidate::from_blocks(blocks).unwrap()
    }

    #[test]
    fn test_all_detected_uses_max_page() {
        let candidates = vec![candidate(1, 3), candidate(4, 9), candidate(9, 12)];
        assert_eq!(
            next_checkpoint(0, &candidates, 1, AdvancePolicy::AllDetected),
            12
        );
    }

    #[test]
    fn test_attempted_stops_before_first_skipped() {
        let candidates = vec![candidate(1, 3), candidate(5, 9), candidate(10, 12)];
        assert_eq!(next_checkpoint(0, &candidates, 1, AdvancePolicy::Attempted), 4);
    }

    #[test]
    fn test_attempted_without_skips_matches_all_detected() {
        let candidates = vec![candidate(1, 3), candidate(5, 9)];
        assert_eq!(next_checkpoint(0, &candidates, 2, AdvancePolicy::Attempted), 9);
    }

    #[test]
    fn test_attempted_never_rereads_an_attempted_page() {
        // The skipped candidate starts on page 3, where the attempted one ends
        let candidates = vec![candidate(1, 3), candidate(3, 6), candidate(7, 9)];
        assert_eq!(next_checkpoint(0, &candidates, 1, AdvancePolicy::Attempted), 3);

        let candidates = vec![candidate(11, 11), candidate(11, 14)];
        assert_eq!(
            next_checkpoint(10, &candidates, 1, AdvancePolicy::Attempted),
            11
        );
    }

    #[test]
    fn test_attempted_falls_back_when_nothing_attempted() {
        let candidates = vec![candidate(11, 12), candidate(13, 14)];
        assert_eq!(
            next_checkpoint(10, &candidates, 0, AdvancePolicy::Attempted),
            14
        );
    }

    #[test]
    fn test_checkpoint_never_moves_back() {
        assert_eq!(next_checkpoint(20, &[], 0, AdvancePolicy::AllDetected), 20);
    }

    #[test]
    fn test_chapter_label() {
        let blocks = vec![
            ContentBlock::new(BlockKind::Text, 1, "Chapter 4 is referenced here"),
            ContentBlock::new(BlockKind::Header, 2, "5.1 Pointers"),
            ContentBlock::new(BlockKind::Header, 3, "Chapter 6 Structures"),
        ];
        assert_eq!(chapter_label(&blocks).as_deref(), Some("Chapter 6 Structures"));
        assert_eq!(chapter_label(&blocks[..2]), None);
    }
}
