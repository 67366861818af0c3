//! Search command implementation.

use crate::cli::SearchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use quarry_store::ConceptIndex;

/// Execute the search command.
pub fn execute_search(args: SearchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.query.trim().is_empty() {
        return Err(CliError::InvalidInput("Query must not be empty".to_string()));
    }
    if args.limit == 0 {
        return Err(CliError::InvalidInput(
            "Limit must be at least 1".to_string(),
        ));
    }

    let index = ConceptIndex::build(&config.output_dir)?;
    let hits = if args.topic {
        let mut hits = index.by_topic(&args.query, usize::MAX);
        if let Some(book) = &args.book {
            hits.retain(|hit| &hit.book == book);
        }
        hits.truncate(args.limit);
        hits
    } else {
        index.search(&args.query, args.book.as_deref(), args.limit)
    };

    println!("{}", formatter.format_hits(&hits)?);

    Ok(())
}
