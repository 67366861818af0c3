//! Concept candidates - grouped blocks awaiting structuring

use crate::block::{BlockKind, ContentBlock};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Inclusive range of 1-based page numbers
///
/// Serialized as the `"first-last"` label used throughout the concept files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSpan {
    /// First page covered
    pub first: u32,
    /// Last page covered
    pub last: u32,
}

impl PageSpan {
    /// Create a span, ordering the bounds if given backwards
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Span covering a single page
    pub fn single(page: u32) -> Self {
        Self::new(page, page)
    }

    /// Whether `page` falls inside the span
    pub fn contains(&self, page: u32) -> bool {
        self.first <= page && page <= self.last
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

impl FromStr for PageSpan {
    type Err = String;

    /// Parse `"3-7"` or a single page `"3"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid page number '{}': {}", part.trim(), e))
        };
        match s.split_once('-') {
            Some((first, last)) => Ok(Self::new(parse(first)?, parse(last)?)),
            None => parse(s).map(Self::single),
        }
    }
}

impl Serialize for PageSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageSpan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A contiguous run of content blocks judged to form one teachable unit.
///
/// Candidates are immutable once built; every derived property
/// ([`page_span`](Self::page_span), [`has_code`](Self::has_code),
/// [`raw_content`](Self::raw_content), ...) is a pure function of the blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptCandidate {
    blocks: Vec<ContentBlock>,
}

impl ConceptCandidate {
    /// Build a candidate from a finalized window of blocks.
    ///
    /// Returns `None` for an empty window.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Option<Self> {
        if blocks.is_empty() {
            None
        } else {
            Some(Self { blocks })
        }
    }

    /// Blocks in original order
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Give the blocks back
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    /// `(first block's page, last block's page)`
    pub fn page_span(&self) -> PageSpan {
        PageSpan {
            first: self.blocks[0].page(),
            last: self.blocks[self.blocks.len() - 1].page(),
        }
    }

    /// Highest page number of any block in the candidate
    pub fn max_page(&self) -> u32 {
        self.blocks.iter().map(ContentBlock::page).max().unwrap_or(0)
    }

    /// At least one code block present
    pub fn has_code(&self) -> bool {
        self.has_kind(BlockKind::Code)
    }

    /// At least one text block present
    pub fn has_explanation(&self) -> bool {
        self.has_kind(BlockKind::Text)
    }

    fn has_kind(&self, kind: BlockKind) -> bool {
        self.blocks.iter().any(|b| b.kind() == kind)
    }

    /// All lines of all blocks, in order, joined by newlines
    pub fn raw_content(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|b| b.lines().iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
