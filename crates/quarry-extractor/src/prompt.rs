//! LLM prompt construction for concept structuring

use crate::context::BookContext;

/// Builds the prompt asking the LLM to structure one candidate
pub struct PromptBuilder<'a> {
    raw_content: &'a str,
    source_title: &'a str,
    context: BookContext,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(raw_content: &'a str, source_title: &'a str, context: BookContext) -> Self {
        Self {
            raw_content,
            source_title,
            context,
        }
    }

    /// Build the complete structuring prompt
    pub fn build(&self) -> String {
        let subject = self.context.subject();
        let mut prompt = String::new();

        // 1. Role and book context
        prompt.push_str(&format!(
            "You are preparing atomic training examples for a model learning {}.\n",
            subject
        ));
        if !self.source_title.is_empty() {
            prompt.push_str(&format!("Source book: {}\n", self.source_title));
        }
        prompt.push_str(self.context.focus());
        prompt.push_str("\n\n");

        // 2. Task
        prompt.push_str(&format!(
            "Extract the single most prominent {} concept from the content below. \
             The example must be {}.\n\n",
            subject,
            self.context.example_kind()
        ));

        // 3. The content
        prompt.push_str("Content:\n---\n");
        prompt.push_str(self.raw_content);
        prompt.push_str("\n---\n\n");

        // 4. Output format
        prompt.push_str(OUTPUT_FORMAT);
        prompt
    }
}

const OUTPUT_FORMAT: &str = r#"Respond with one JSON object and nothing else:
{
  "topic": "Concept name",
  "explanation": "What the concept is and why it is used",
  "syntax": "General form or pattern",
  "code_example": ["line 1", "line 2", "..."],
  "example_explanation": "How the example demonstrates the concept"
}"#;
