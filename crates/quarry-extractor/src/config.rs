//! Configuration for extraction sessions

use serde::{Deserialize, Serialize};

/// How far the checkpoint advances after a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Advance past every candidate detected in the window, including ones
    /// that failed or were never attempted because of the per-session cap
    #[default]
    AllDetected,
    /// Stop before the first candidate left unattempted by the cap so it is
    /// picked up next session
    Attempted,
}

/// Configuration for the extraction session controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Candidates sent to the structuring service per session
    pub max_concepts_per_session: usize,

    /// Pages read per session
    pub window_size: usize,

    /// Pages whose trimmed text is shorter than this are skipped
    pub min_page_chars: usize,

    /// Checkpoint advance policy
    pub advance_policy: AdvancePolicy,

    /// Minimum lines in a concept's code example
    pub min_code_lines: usize,

    /// Require code examples to look like complete C programs
    pub require_complete_program: bool,
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_concepts_per_session: 5,
            window_size: 15,
            min_page_chars: 50,
            advance_policy: AdvancePolicy::AllDetected,
            min_code_lines: 3,
            require_complete_program: false,
        }
    }
}

impl ExtractorConfig {
    /// Conservative preset: fewer LLM calls per run, smaller windows
    pub fn conservative() -> Self {
        Self {
            max_concepts_per_session: 4,
            window_size: 10,
            ..Self::default()
        }
    }

    /// Thorough preset: more candidates per run, never skips unattempted ones
    pub fn thorough() -> Self {
        Self {
            max_concepts_per_session: 10,
            window_size: 20,
            advance_policy: AdvancePolicy::Attempted,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concepts_per_session == 0 {
            return Err("max_concepts_per_session must be greater than 0".to_string());
        }
        if self.window_size == 0 {
            return Err("window_size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
