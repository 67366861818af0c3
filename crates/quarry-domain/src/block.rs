//! Content blocks - typed runs of lines from a single page

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Chapter or section heading
    Header,
    /// Source code
    Code,
    /// Explanatory prose
    Text,
    /// Prose at the top of a page before any header or code was seen
    Unclassified,
}

impl BlockKind {
    /// Header and code blocks are single-topic: anything else following them
    /// starts a new block.
    pub fn is_strong(&self) -> bool {
        matches!(self, BlockKind::Header | BlockKind::Code)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Header => "header",
            BlockKind::Code => "code",
            BlockKind::Text => "text",
            BlockKind::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// A maximal run of consecutive non-empty lines on one page sharing one kind.
///
/// A block always holds at least one line and never spans pages; both are
/// guaranteed by construction, since the only way to build one is from a first
/// line and more lines can only be appended. Deserialization rejects blocks
/// without lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct ContentBlock {
    kind: BlockKind,
    lines: Vec<String>,
    page: u32,
}

#[derive(Deserialize)]
struct RawBlock {
    kind: BlockKind,
    lines: Vec<String>,
    page: u32,
}

impl TryFrom<RawBlock> for ContentBlock {
    type Error = String;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        if raw.lines.is_empty() {
            return Err(format!("{} block on page {} has no lines", raw.kind, raw.page));
        }
        Ok(Self {
            kind: raw.kind,
            lines: raw.lines,
            page: raw.page,
        })
    }
}

impl ContentBlock {
    /// Start a block on `page` (1-based) with its first line
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::{BlockKind, ContentBlock};
    ///
    /// let mut block = ContentBlock::new(BlockKind::Code, 3, "int x;");
    /// block.push_line("x = 1;");
    /// assert_eq!(block.lines().len(), 2);
    /// assert_eq!(block.page(), 3);
    /// ```
    pub fn new(kind: BlockKind, page: u32, first_line: impl Into<String>) -> Self {
        Self {
            kind,
            lines: vec![first_line.into()],
            page,
        }
    }

    /// Append a line to the block
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Block classification
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Lines in original page order (never empty)
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 1-based page the block came from
    pub fn page(&self) -> u32 {
        self.page
    }
}
