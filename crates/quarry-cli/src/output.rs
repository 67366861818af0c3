//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use quarry_extractor::{SessionOutcome, SessionReport, SessionState};
use quarry_store::{BookSummary, IndexedConcept, SearchHit};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of one extraction session.
    pub fn format_outcome(&self, book: &str, outcome: &SessionOutcome) -> Result<String> {
        match (self.format, outcome) {
            (OutputFormat::Json, SessionOutcome::Complete { last_processed_page }) => {
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "book": book,
                    "complete": true,
                    "last_processed_page": last_processed_page,
                }))?)
            }
            (OutputFormat::Json, SessionOutcome::Progressed(report)) => {
                Ok(serde_json::to_string_pretty(&report_json(book, report))?)
            }
            (OutputFormat::Quiet, SessionOutcome::Complete { .. }) => Ok(String::new()),
            (OutputFormat::Quiet, SessionOutcome::Progressed(report)) => Ok(report
                .stored
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            (OutputFormat::Table, SessionOutcome::Complete { last_processed_page }) => {
                Ok(self.info(&format!(
                    "{}: extraction complete at page {}",
                    book, last_processed_page
                )))
            }
            (OutputFormat::Table, SessionOutcome::Progressed(report)) => {
                Ok(self.format_report_text(book, report))
            }
        }
    }

    fn format_report_text(&self, book: &str, report: &SessionReport) -> String {
        let mut lines = vec![self.success(&format!(
            "{}: pages {}, {} of {} candidates stored ({} detected)",
            book,
            report.pages,
            report.concepts_extracted(),
            report.candidates_attempted,
            report.candidates_detected
        ))];

        for id in &report.stored {
            lines.push(format!("  + {}", id));
        }
        for failure in &report.failures {
            lines.push(self.warning(&format!(
                "candidate {} (pages {}): {}",
                failure.index, failure.pages, failure.reason
            )));
        }
        lines.push(format!(
            "  checkpoint: page {}, {} concepts in total",
            report.last_processed_page, report.total_concepts_extracted
        ));
        lines.join("\n")
    }

    /// Format a book's session state.
    pub fn format_status(&self, book: &str, state: &SessionState) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(state)?),
            OutputFormat::Quiet => Ok(state.last_processed_page.to_string()),
            OutputFormat::Table => {
                let mut out = format!(
                    "{}\n  last processed page: {}\n  concepts extracted: {}\n  sessions: {}",
                    self.colorize(book, "cyan"),
                    state.last_processed_page,
                    state.total_concepts_extracted,
                    state.session_history.len()
                );
                if state.session_history.is_empty() {
                    return Ok(out);
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Pages", "Checkpoint", "Concepts", "Chapter"]);
                for (n, record) in state.session_history.iter().enumerate() {
                    builder.push_record([
                        (n + 1).to_string(),
                        record.page_range.to_string(),
                        record.checkpoint_page.to_string(),
                        record.concepts_extracted.to_string(),
                        record.chapter.clone().unwrap_or_default(),
                    ]);
                }
                out.push('\n');
                out.push_str(&self.table(builder));
                Ok(out)
            }
        }
    }

    /// Format search hits.
    pub fn format_hits(&self, hits: &[SearchHit]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json_hits: Vec<serde_json::Value> = hits
                    .iter()
                    .map(|h| {
                        serde_json::json!({
                            "id": h.id.as_str(),
                            "topic": h.topic,
                            "book": h.book,
                            "book_title": h.book_title,
                            "explanation": h.explanation_preview,
                            "syntax": h.syntax,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json_hits)?)
            }
            OutputFormat::Quiet => Ok(hits
                .iter()
                .map(|h| h.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if hits.is_empty() {
                    return Ok(self.colorize("No concepts found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Topic", "Book", "Explanation"]);
                for hit in hits {
                    builder.push_record([
                        hit.id.to_string(),
                        hit.topic.clone(),
                        hit.book.clone(),
                        shorten(&hit.explanation_preview, 60),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format one concept in full.
    pub fn format_concept(&self, indexed: &IndexedConcept) -> Result<String> {
        let concept = &indexed.concept;
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(concept)?),
            OutputFormat::Quiet => Ok(indexed.id.to_string()),
            OutputFormat::Table => {
                let mut out = String::new();
                out.push_str(&self.colorize(&concept.topic, "cyan"));
                out.push_str(&format!("\n{} ({})\n\n", indexed.id, indexed.book_title));
                out.push_str(&concept.explanation);
                if !concept.syntax.is_empty() {
                    out.push_str(&format!("\n\nSyntax: {}", concept.syntax));
                }
                if !concept.code_example.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&concept.code_text());
                }
                if !concept.example_explanation.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&concept.example_explanation);
                }
                if let Some(meta) = &concept.extraction_metadata {
                    out.push_str(&format!(
                        "\n\n{}",
                        self.colorize(
                            &format!("pages {} · {}", meta.page_range, meta.book_context),
                            "magenta"
                        )
                    ));
                }
                Ok(out)
            }
        }
    }

    /// Format the book listing.
    pub fn format_books(&self, books: &[BookSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json_books: Vec<serde_json::Value> = books
                    .iter()
                    .map(|b| {
                        serde_json::json!({
                            "id": b.info.id,
                            "title": b.info.title,
                            "authors": b.info.authors,
                            "focus": b.info.focus,
                            "concepts": b.concept_count,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json_books)?)
            }
            OutputFormat::Quiet => Ok(books
                .iter()
                .map(|b| b.info.id.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if books.is_empty() {
                    return Ok(self.colorize("No books found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Authors", "Concepts"]);
                for book in books {
                    builder.push_record([
                        book.info.id.clone(),
                        book.info.title.clone(),
                        book.info.authors.clone().unwrap_or_default(),
                        book.concept_count.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn report_json(book: &str, report: &SessionReport) -> serde_json::Value {
    serde_json::json!({
        "book": book,
        "complete": false,
        "pages": report.pages,
        "last_processed_page": report.last_processed_page,
        "candidates_detected": report.candidates_detected,
        "candidates_attempted": report.candidates_attempted,
        "stored": report.stored,
        "failures": report.failures.iter().map(|f| serde_json::json!({
            "index": f.index,
            "pages": f.pages,
            "reason": f.reason.to_string(),
        })).collect::<Vec<_>>(),
        "total_concepts_extracted": report.total_concepts_extracted,
    })
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::{ConceptId, PageSpan};
    use quarry_extractor::{CandidateFailure, FailureReason};

    fn report() -> SessionReport {
        SessionReport {
            pages: PageSpan::new(1, 15),
            last_processed_page: 15,
            candidates_detected: 6,
            candidates_attempted: 5,
            stored: vec![ConceptId::from_raw("kr_001_pointers")],
            failures: vec![CandidateFailure {
                index: 2,
                pages: PageSpan::new(7, 8),
                reason: FailureReason::Unusable,
            }],
            total_concepts_extracted: 1,
        }
    }

    fn hit() -> SearchHit {
        SearchHit {
            id: ConceptId::from_raw("kr_001_pointers"),
            topic: "Pointers".to_string(),
            book: "kr".to_string(),
            book_title: "The C Programming Language".to_string(),
            explanation_preview: "A pointer holds an address.".to_string(),
            syntax: "type *name;".to_string(),
        }
    }

    #[test]
    fn test_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_outcome("kr", &SessionOutcome::Progressed(report()))
            .unwrap();
        assert!(output.contains("pages 1-15, 1 of 5 candidates stored (6 detected)"));
        assert!(output.contains("+ kr_001_pointers"));
        assert!(output.contains("candidate 2 (pages 7-8): no usable concept"));
    }

    #[test]
    fn test_report_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_outcome("kr", &SessionOutcome::Progressed(report()))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["pages"], "1-15");
        assert_eq!(value["stored"][0], "kr_001_pointers");
        assert_eq!(value["failures"][0]["reason"], "no usable concept");
    }

    #[test]
    fn test_complete_quiet_is_empty() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .format_outcome(
                "kr",
                &SessionOutcome::Complete {
                    last_processed_page: 270,
                },
            )
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_hits_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_hits(&[hit()]).unwrap();
        assert!(output.contains("Topic"));
        assert!(output.contains("kr_001_pointers"));
    }

    #[test]
    fn test_hits_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_hits(&[hit()]).unwrap(), "kr_001_pointers");
    }

    #[test]
    fn test_empty_hits() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_hits(&[]).unwrap();
        assert!(output.contains("No concepts found"));
    }

    #[test]
    fn test_status_table_lists_sessions() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let state = SessionState {
            last_processed_page: 15,
            total_concepts_extracted: 4,
            session_history: vec![quarry_extractor::SessionRecord {
                timestamp: 0,
                concepts_extracted: 4,
                page_range: PageSpan::new(1, 15),
                checkpoint_page: 15,
                chapter: Some("Chapter 1 A Tutorial Introduction".to_string()),
            }],
        };
        let output = formatter.format_status("kr", &state).unwrap();
        assert!(output.contains("last processed page: 15"));
        assert!(output.contains("Chapter 1 A Tutorial Introduction"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("boom"), "✗ boom");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("a long explanation here", 10), "a long...");
    }
}
