//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use quarry_extractor::{BookContext, ExtractorConfig};
use quarry_llm::OllamaConfig;
use quarry_store::BookInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory concept files are written to, one subdirectory per book
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding one session state file per book
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Extraction session settings
    #[serde(default)]
    pub extraction: ExtractorConfig,

    /// LLM backend settings
    #[serde(default)]
    pub llm: OllamaConfig,

    /// Configured books, keyed by book id
    #[serde(default)]
    pub books: BTreeMap<String, BookProfile>,
}

/// A book the CLI knows how to extract from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookProfile {
    /// Full title
    pub title: String,

    /// PDF or form-feed separated text file
    pub pdf: PathBuf,

    /// Author line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    /// What concepts from this book should focus on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,

    /// Fixed book context; detected from the title and content when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BookContext>,
}

impl BookProfile {
    /// Store metadata for this book under `id`.
    pub fn book_info(&self, id: &str) -> BookInfo {
        BookInfo {
            id: id.to_string(),
            title: self.title.clone(),
            authors: self.authors.clone(),
            focus: self.focus.clone(),
        }
    }
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl From<crate::cli::CliFormat> for OutputFormat {
    fn from(format: crate::cli::CliFormat) -> Self {
        match format {
            crate::cli::CliFormat::Table => OutputFormat::Table,
            crate::cli::CliFormat::Json => OutputFormat::Json,
            crate::cli::CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

impl Config {
    /// Directory holding Quarry's configuration and default data.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".quarry"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.extraction.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Look up a configured book.
    pub fn book(&self, id: &str) -> Result<&BookProfile> {
        self.books.get(id).ok_or_else(|| {
            CliError::Config(format!(
                "Book '{}' is not configured; add a [books.{}] table",
                id, id
            ))
        })
    }

    /// Session state file for a book.
    pub fn progress_path(&self, book_id: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", book_id))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            state_dir: default_state_dir(),
            settings: Settings::default(),
            extraction: ExtractorConfig::default(),
            llm: OllamaConfig::default(),
            books: BTreeMap::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn data_dir() -> PathBuf {
    Config::home().unwrap_or_else(|_| PathBuf::from(".quarry"))
}

fn default_output_dir() -> PathBuf {
    data_dir().join("concepts")
}

fn default_state_dir() -> PathBuf {
    data_dir().join("progress")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
