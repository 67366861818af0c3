//! Show command implementation.

use crate::cli::ShowArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use quarry_store::ConceptIndex;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let index = ConceptIndex::build(&config.output_dir)?;
    let concept = index
        .get(&args.id)
        .ok_or_else(|| CliError::NotFound(format!("Concept '{}'", args.id)))?;

    println!("{}", formatter.format_concept(concept)?);

    Ok(())
}
