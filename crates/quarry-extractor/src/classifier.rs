//! Content classification
//!
//! Splits one page of extracted text into typed [`ContentBlock`]s. Every
//! non-empty line is trimmed and classified on its own:
//!
//! 1. **Header**: a short line that looks like a chapter heading, a numbered
//!    section heading (`2.3 Pointers`), or a title-cased line of letters only
//! 2. **Code**: a line with C syntax tokens (preprocessor includes, `main(`,
//!    common library calls, control-flow parentheses, braces, trailing
//!    semicolons, comments)
//! 3. **Text**: everything else
//!
//! Header wins when a line could be both. Consecutive lines of the same
//! header or code kind accumulate into one block. A prose line extends a
//! text block, starts a text block after header or code, or opens an
//! unclassified block at the top of a page.

use std::sync::LazyLock;

use quarry_domain::traits::PageText;
use quarry_domain::{BlockKind, ContentBlock};
use regex::{Regex, RegexSet};

/// Header lines are never longer than this
pub const MAX_HEADER_CHARS: usize = 80;

static HEADER_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^Chapter\s+\d+",
        r"^\d+\.\d+\s+\w+",
        r"^[A-Z][A-Za-z\s]+$",
    ])
    .expect("header patterns are valid")
});

static CODE_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"#include\s*<",
        r"\b(?:int|void)\s+main\s*\(",
        r"\b(?:printf|fprintf|sprintf|scanf|puts|putchar|getchar|malloc)\s*\(",
        r"\b(?:for|while|if|switch)\s*\(",
        r"^\s*[{}]",
        r";\s*$",
        r"/\*.*\*/",
        r"//",
    ])
    .expect("code patterns are valid")
});

static CHAPTER_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Chapter\s+\d+").expect("chapter pattern is valid"));

/// Classification of a single trimmed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading line
    Header,
    /// Source code line
    Code,
    /// Anything else; prose
    Text,
}

/// Classify a single trimmed, non-empty line
pub fn classify_line(line: &str) -> LineKind {
    if is_header(line) {
        LineKind::Header
    } else if is_code_line(line) {
        LineKind::Code
    } else {
        LineKind::Text
    }
}

/// Whether `line` looks like a chapter or section heading
pub fn is_header(line: &str) -> bool {
    line.chars().count() < MAX_HEADER_CHARS && HEADER_PATTERNS.is_match(line)
}

/// Whether `line` carries C syntax
pub fn is_code_line(line: &str) -> bool {
    CODE_PATTERNS.is_match(line)
}

/// Whether `line` opens a numbered chapter (`Chapter 5 ...`)
pub fn is_chapter_heading(line: &str) -> bool {
    CHAPTER_HEADING.is_match(line)
}

/// Whether a page has too little text to be worth classifying
pub fn is_sparse(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() < min_chars
}

/// Splits page text into content blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentClassifier {
    min_page_chars: usize,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ContentClassifier {
    /// Create a classifier that skips pages shorter than `min_page_chars`
    pub fn new(min_page_chars: usize) -> Self {
        Self { min_page_chars }
    }

    /// Classify every page in order, skipping sparse ones
    pub fn classify_pages(&self, pages: &[PageText]) -> Vec<ContentBlock> {
        pages
            .iter()
            .filter(|page| {
                let sparse = is_sparse(&page.text, self.min_page_chars);
                if sparse {
                    tracing::debug!(page = page.number, "Skipping sparse page");
                }
                !sparse
            })
            .flat_map(|page| classify_page(&page.text, page.number))
            .collect()
    }
}

/// Split the text of one page into blocks, in reading order.
///
/// Every non-empty trimmed line ends up in exactly one block; blank lines are
/// dropped. The sparse-page check is the caller's job.
///
/// # Examples
///
/// ```
/// use quarry_domain::BlockKind;
/// use quarry_extractor::classifier::classify_page;
///
/// let blocks = classify_page("Pointers\nA pointer holds an address.\nint *p;\n", 7);
/// let kinds: Vec<_> = blocks.iter().map(|b| b.kind()).collect();
/// assert_eq!(kinds, vec![BlockKind::Header, BlockKind::Text, BlockKind::Code]);
/// assert!(blocks.iter().all(|b| b.page() == 7));
/// ```
pub fn classify_page(text: &str, page: u32) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<ContentBlock> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let next_kind = match classify_line(line) {
            LineKind::Header => BlockKind::Header,
            LineKind::Code => BlockKind::Code,
            LineKind::Text => match current.as_ref().map(ContentBlock::kind) {
                None => BlockKind::Unclassified,
                Some(kind) if kind.is_strong() => BlockKind::Text,
                // Prose extends whatever prose block is open
                Some(kind) => kind,
            },
        };

        match current.as_mut() {
            Some(block) if block.kind() == next_kind => block.push_line(line),
            _ => blocks.extend(current.replace(ContentBlock::new(next_kind, page, line))),
        }
    }

    blocks.extend(current);
    blocks
}
