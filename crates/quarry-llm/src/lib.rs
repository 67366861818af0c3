//! Quarry LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind the `LlmProvider` trait from
//! `quarry-domain`. The structuring service in `quarry-extractor` is generic
//! over these.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use quarry_llm::MockProvider;
//! use quarry_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"topic": "Arrays"}"#);
//! let reply = provider.generate("Extract one concept from:").unwrap();
//! assert!(reply.contains("Arrays"));
//! ```

#![warn(missing_docs)]

pub mod ollama;

use quarry_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::{OllamaConfig, OllamaProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail,
}

/// Scripted, network-free LLM stand-in
///
/// Returns pre-configured responses without making any network calls. A
/// scripted response fires when its trigger text appears anywhere in the
/// prompt; the first matching trigger (in insertion order) wins.
///
/// # Examples
///
/// ```
/// use quarry_llm::MockProvider;
/// use quarry_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("{}");
/// assert_eq!(provider.generate("page 7").unwrap(), "{}");
///
/// // Responses keyed on prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response("pointers", "response1");
/// provider.add_error("linker");
/// assert_eq!(provider.generate("explain pointers").unwrap(), "response1");
/// assert!(provider.generate("the linker script").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, Scripted)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Reply with `response` to every prompt no trigger matches
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `response` to any prompt containing `trigger`
    pub fn add_response(&mut self, trigger: impl Into<String>, response: impl Into<String>) {
        self.script(trigger.into(), Scripted::Respond(response.into()));
    }

    /// Fail any prompt containing `trigger`
    pub fn add_error(&mut self, trigger: impl Into<String>) {
        self.script(trigger.into(), Scripted::Fail);
    }

    fn script(&mut self, trigger: String, outcome: Scripted) {
        self.responses
            .lock()
            .expect("mock response table poisoned")
            .push((trigger, outcome));
    }

    /// Number of prompts received since the last reset
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("mock prompt log poisoned").len()
    }

    /// Every prompt received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock prompt log poisoned").clone()
    }

    /// Forget every recorded prompt
    pub fn reset_call_count(&self) {
        self.prompts.lock().expect("mock prompt log poisoned").clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts
            .lock()
            .map_err(|e| LlmError::Other(format!("Mock lock error: {}", e)))?
            .push(prompt.to_string());

        let responses = self
            .responses
            .lock()
            .map_err(|e| LlmError::Other(format!("Mock lock error: {}", e)))?;

        match responses.iter().find(|(trigger, _)| prompt.contains(trigger.as_str())) {
            Some((_, Scripted::Respond(response))) => Ok(response.clone()),
            Some((_, Scripted::Fail)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONCEPT_JSON: &str = r#"{"topic": "Pointers", "explanation": "Addresses."}"#;

    #[test]
    fn test_unscripted_prompt_gets_fixed_reply() {
        let provider = MockProvider::new(CONCEPT_JSON);
        assert_eq!(provider.generate("Structure this content").unwrap(), CONCEPT_JSON);
        assert_eq!(provider.model_name(), "mock");
    }

    #[test]
    fn test_reply_keyed_on_prompt_content() {
        let mut provider = MockProvider::new("not json");
        provider.add_response("int *p", CONCEPT_JSON);
        provider.add_response("struct point", "{}");

        assert_eq!(provider.generate("...int *p = &x;...").unwrap(), CONCEPT_JSON);
        assert_eq!(provider.generate("struct point { int x; };").unwrap(), "{}");
        assert_eq!(provider.generate("while (c != EOF)").unwrap(), "not json");
    }

    #[test]
    fn test_earliest_trigger_takes_precedence() {
        let mut provider = MockProvider::default();
        provider.add_response("printf", "general");
        provider.add_response("printf(\"%d", "specific");
        assert_eq!(provider.generate("printf(\"%d\\n\", x);").unwrap(), "general");
    }

    #[test]
    fn test_prompt_log_tracks_calls() {
        let provider = MockProvider::default();
        assert_eq!(provider.call_count(), 0);

        for page in ["page 12", "page 13"] {
            provider.generate(page).unwrap();
        }
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["page 12", "page 13"]);

        provider.reset_call_count();
        assert!(provider.prompts().is_empty());
    }

    #[test]
    fn test_scripted_failure_is_still_counted() {
        let mut provider = MockProvider::default();
        provider.add_error("Chapter 8");

        let err = provider.generate("Chapter 8 The UNIX System Interface").unwrap_err();
        assert!(matches!(err, LlmError::Other(_)));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let mut original = MockProvider::default();
        let copy = original.clone();

        original.add_response("linker", "resolved");
        assert_eq!(copy.generate("the linker").unwrap(), "resolved");
        assert_eq!(original.call_count(), 1);
    }
}
