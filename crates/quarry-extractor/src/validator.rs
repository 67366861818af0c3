//! Concept quality validation

use std::fmt;

use quarry_domain::AtomicConcept;

use crate::config::ExtractorConfig;

/// Result of concept validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Rejection reasons; empty when the concept was accepted
    pub reasons: Vec<RejectionReason>,
}

impl ValidationResult {
    /// Whether the concept passed every check
    pub fn is_accepted(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// A required field is empty
    MissingField(&'static str),

    /// Code example has fewer non-blank lines than required
    CodeTooShort {
        /// Non-blank lines present
        lines: usize,
        /// Minimum required
        required: usize,
    },

    /// Code example lacks `#include` or `main`
    IncompleteProgram,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingField(field) => write!(f, "missing {}", field),
            RejectionReason::CodeTooShort { lines, required } => {
                write!(f, "code example has {} lines, need {}", lines, required)
            }
            RejectionReason::IncompleteProgram => {
                f.write_str("code example is not a complete program")
            }
        }
    }
}

/// Rejects structured concepts that are not useful training examples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityValidator {
    min_code_lines: usize,
    require_complete_program: bool,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl QualityValidator {
    /// Create a validator
    pub fn new(min_code_lines: usize, require_complete_program: bool) -> Self {
        Self {
            min_code_lines,
            require_complete_program,
        }
    }

    /// Create a validator from the quality settings of `config`
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.min_code_lines, config.require_complete_program)
    }

    /// Validate a concept against the configured rules
    pub fn validate(&self, concept: &AtomicConcept) -> ValidationResult {
        let mut reasons = Vec::new();

        // 1. Required fields
        let required = [
            ("topic", concept.topic.as_str()),
            ("explanation", concept.explanation.as_str()),
            ("example_explanation", concept.example_explanation.as_str()),
        ];
        reasons.extend(
            required
                .iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|&(name, _)| RejectionReason::MissingField(name)),
        );

        // 2. Code example length
        let lines = concept
            .code_example
            .iter()
            .filter(|line| !line.trim().is_empty())
            .count();
        if lines == 0 {
            reasons.push(RejectionReason::MissingField("code_example"));
        } else if lines < self.min_code_lines {
            reasons.push(RejectionReason::CodeTooShort {
                lines,
                required: self.min_code_lines,
            });
        }

        // 3. Complete program
        if self.require_complete_program && lines > 0 {
            let code = concept.code_text();
            if !(code.contains("#include") && code.contains("main")) {
                reasons.push(RejectionReason::IncompleteProgram);
            }
        }

        ValidationResult { reasons }
    }
}
