//! Extract command implementation.

use std::path::Path;

use crate::cli::ExtractArgs;
use crate::config::{BookProfile, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use quarry_domain::traits::DocumentSource;
use quarry_extractor::{
    BookTarget, LlmStructurer, PdfDocument, ProgressTracker, QualityValidator, SessionController,
    SessionOutcome, TextDocument,
};
use quarry_llm::OllamaProvider;
use quarry_store::JsonConceptStore;
use tracing::info;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.sessions == 0 {
        return Err(CliError::InvalidInput(
            "At least one session must be requested".to_string(),
        ));
    }

    let profile = config.book(&args.book)?;
    let document = args.document.as_deref().unwrap_or(&profile.pdf);
    info!(book = %args.book, document = %document.display(), "Opening document");

    let outcomes = if is_pdf(document) {
        let mut source = PdfDocument::open(document)?;
        run(&args, profile, config, &mut source)?
    } else {
        let mut source = TextDocument::from_file(document)?;
        run(&args, profile, config, &mut source)?
    };

    for outcome in &outcomes {
        let output = formatter.format_outcome(&args.book, outcome)?;
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    Ok(())
}

fn run<D>(
    args: &ExtractArgs,
    profile: &BookProfile,
    config: &Config,
    source: &mut D,
) -> Result<Vec<SessionOutcome>>
where
    D: DocumentSource,
    D::Error: std::fmt::Display,
{
    let mut llm_config = config.llm.clone();
    if let Some(model) = &args.model {
        llm_config.model = model.clone();
    }
    let llm = OllamaProvider::from_config(&llm_config)?;

    let mut structurer = LlmStructurer::new(llm)
        .with_validator(QualityValidator::from_config(&config.extraction));
    if let Some(context) = profile.context {
        structurer = structurer.with_context(context);
    }

    let store = JsonConceptStore::open(&config.output_dir, &profile.book_info(&args.book))?;
    let tracker = ProgressTracker::load(config.progress_path(&args.book));

    let mut controller = SessionController::new(
        BookTarget::new(&args.book, &profile.title),
        structurer,
        store,
        tracker,
        config.extraction.clone(),
    )?;

    Ok(controller.run_sessions(source, args.sessions)?)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
