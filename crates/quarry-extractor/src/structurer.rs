//! LLM-backed structuring service

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use quarry_domain::traits::{LlmProvider, StructuringRequest, StructuringService};
use quarry_domain::{AtomicConcept, ExtractionMetadata};
use tracing::{debug, warn};

use crate::context::BookContext;
use crate::error::ExtractorError;
use crate::parser::parse_concept_response;
use crate::prompt::PromptBuilder;
use crate::validator::QualityValidator;

/// Structures candidates by prompting an LLM, then validates the result.
///
/// Unparseable or rejected output is reported as `Ok(None)`; only a failure
/// to reach the LLM is an error.
pub struct LlmStructurer<L> {
    llm: L,
    validator: QualityValidator,
    context: Option<BookContext>,
}

impl<L> LlmStructurer<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a structurer with the default validator
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            validator: QualityValidator::default(),
            context: None,
        }
    }

    /// Use `validator` to judge structured concepts
    pub fn with_validator(mut self, validator: QualityValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Always use `context` instead of detecting it per candidate
    pub fn with_context(mut self, context: BookContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The underlying LLM provider
    pub fn llm(&self) -> &L {
        &self.llm
    }
}

impl<L> StructuringService for LlmStructurer<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn structure(&self, request: &StructuringRequest) -> Result<Option<AtomicConcept>, Self::Error> {
        let context = self
            .context
            .unwrap_or_else(|| BookContext::detect(&request.source_title, &request.raw_content));
        let prompt = PromptBuilder::new(&request.raw_content, &request.source_title, context).build();

        debug!(
            model = self.llm.model_name(),
            pages = %request.page_range,
            context = %context,
            "Structuring candidate"
        );
        let response = self
            .llm
            .generate(&prompt)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        let mut concept = match parse_concept_response(&response) {
            Ok(concept) => concept,
            Err(e) => {
                warn!(pages = %request.page_range, error = %e, "Discarding unparseable response");
                return Ok(None);
            }
        };

        let validation = self.validator.validate(&concept);
        if !validation.is_accepted() {
            let reasons: Vec<String> = validation.reasons.iter().map(|r| r.to_string()).collect();
            warn!(
                pages = %request.page_range,
                topic = %concept.topic,
                reasons = %reasons.join("; "),
                "Concept rejected"
            );
            return Ok(None);
        }

        concept.extraction_metadata = Some(ExtractionMetadata {
            source: request.source_title.clone(),
            page_range: request.page_range,
            extracted_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            has_code: request.has_code,
            has_explanation: request.has_explanation,
            book_context: context.as_str().to_string(),
        });
        Ok(Some(concept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::PageSpan;
    use quarry_llm::MockProvider;

    const GOOD: &str = r#"{
        "topic": "Pointer Arithmetic",
        "explanation": "Adding n to a pointer advances it by n elements.",
        "syntax": "p + n",
        "code_example": ["int a[2] = {1, 2};", "int *p = a;", "p = p + 1;"],
        "example_explanation": "p ends up pointing at a[1]."
    }"#;

    fn request() -> StructuringRequest {
        StructuringRequest {
            raw_content: "Pointer arithmetic\np + 1 points at the next element;".to_string(),
            source_title: "The C Programming Language".to_string(),
            page_range: PageSpan::new(98, 99),
            has_code: true,
            has_explanation: true,
        }
    }

    #[test]
    fn test_structures_and_attaches_metadata() {
        let structurer = LlmStructurer::new(MockProvider::new(GOOD));
        let concept = structurer.structure(&request()).unwrap().unwrap();

        assert_eq!(concept.topic, "Pointer Arithmetic");
        let meta = concept.extraction_metadata.unwrap();
        assert_eq!(meta.source, "The C Programming Language");
        assert_eq!(meta.page_range, PageSpan::new(98, 99));
        assert_eq!(meta.book_context, "c_programming");
        assert!(meta.has_code);
    }

    #[test]
    fn test_unparseable_response_is_none() {
        let structurer = LlmStructurer::new(MockProvider::new("I cannot help with that."));
        assert!(structurer.structure(&request()).unwrap().is_none());
    }

    #[test]
    fn test_rejected_concept_is_none() {
        let structurer = LlmStructurer::new(MockProvider::new(GOOD))
            .with_validator(QualityValidator::new(10, false));
        assert!(structurer.structure(&request()).unwrap().is_none());
    }

    #[test]
    fn test_llm_failure_is_error() {
        let mut llm = MockProvider::new(GOOD);
        llm.add_error("Pointer arithmetic");
        let structurer = LlmStructurer::new(llm);
        assert!(matches!(
            structurer.structure(&request()),
            Err(ExtractorError::Llm(_))
        ));
    }

    #[test]
    fn test_context_override() {
        let structurer =
            LlmStructurer::new(MockProvider::new(GOOD)).with_context(BookContext::OperatingSystems);
        let concept = structurer.structure(&request()).unwrap().unwrap();
        assert_eq!(
            concept.extraction_metadata.unwrap().book_context,
            "operating_systems"
        );
        assert!(structurer.llm().prompts()[0].contains("operating systems"));
    }
}
