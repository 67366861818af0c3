//! Concept boundary detection
//!
//! Groups the ordered block stream of a window into concept candidates with a
//! single pass over a growing window of blocks:
//!
//! - A header closes the open window (if any) and starts a new one
//! - Any other block joins the window, which closes as soon as it is complete
//! - Whatever is left at the end of the stream becomes a final candidate
//!
//! A window is complete when it pairs prose with code, or when it has grown
//! past the block limit without doing so.

use quarry_domain::{BlockKind, ConceptCandidate, ContentBlock};

/// Default number of blocks a window may hold before it closes regardless
pub const DEFAULT_BLOCK_LIMIT: usize = 3;

/// Groups content blocks into concept candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryDetector {
    block_limit: usize,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self {
            block_limit: DEFAULT_BLOCK_LIMIT,
        }
    }
}

impl BoundaryDetector {
    /// Detector closing windows once they exceed `block_limit` blocks
    pub fn with_block_limit(block_limit: usize) -> Self {
        Self { block_limit }
    }

    /// Whether `window` forms a complete candidate
    pub fn is_complete(&self, window: &[ContentBlock]) -> bool {
        let has_text = window.iter().any(|b| b.kind() == BlockKind::Text);
        let has_code = window.iter().any(|b| b.kind() == BlockKind::Code);
        (has_text && has_code) || window.len() > self.block_limit
    }

    /// Partition `blocks` into candidates, preserving order.
    ///
    /// Concatenating the blocks of the returned candidates gives back exactly
    /// the input sequence.
    pub fn detect(&self, blocks: Vec<ContentBlock>) -> Vec<ConceptCandidate> {
        let mut candidates = Vec::new();
        let mut window: Vec<ContentBlock> = Vec::new();

        for block in blocks {
            if block.kind() == BlockKind::Header {
                candidates.extend(ConceptCandidate::from_blocks(std::mem::take(&mut window)));
                window.push(block);
                continue;
            }

            window.push(block);
            if self.is_complete(&window) {
                candidates.extend(ConceptCandidate::from_blocks(std::mem::take(&mut window)));
            }
        }

        candidates.extend(ConceptCandidate::from_blocks(window));
        candidates
    }
}

/// Partition `blocks` into candidates with the default block limit
pub fn detect_concepts(blocks: Vec<ContentBlock>) -> Vec<ConceptCandidate> {
    BoundaryDetector::default().detect(blocks)
}
