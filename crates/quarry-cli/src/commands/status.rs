//! Status command implementation.

use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use quarry_extractor::ProgressTracker;

/// Execute the status command.
pub fn execute_status(args: StatusArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    config.book(&args.book)?;

    let tracker = ProgressTracker::load(config.progress_path(&args.book));
    println!("{}", formatter.format_status(&args.book, tracker.state())?);

    Ok(())
}
