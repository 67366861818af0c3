//! Books command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use quarry_store::{BookSummary, ConceptIndex};

/// Execute the books command.
pub fn execute_books(config: &Config, formatter: &Formatter) -> Result<()> {
    let index = ConceptIndex::build(&config.output_dir)?;
    let books = merge_configured(index.books(), config);

    println!("{}", formatter.format_books(&books)?);

    Ok(())
}

/// Add configured books that have no concepts on disk yet.
fn merge_configured(mut books: Vec<BookSummary>, config: &Config) -> Vec<BookSummary> {
    for (id, profile) in &config.books {
        if !books.iter().any(|b| &b.info.id == id) {
            books.push(BookSummary {
                info: profile.book_info(id),
                concept_count: 0,
            });
        }
    }
    books.sort_by(|a, b| a.info.id.cmp(&b.info.id));
    books
}
