//! CLI command definitions and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quarry - mine atomic programming concepts from technical books.
#[derive(Debug, Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run extraction sessions for a configured book
    Extract(ExtractArgs),

    /// Show extraction progress for a book
    Status(StatusArgs),

    /// Keyword search over extracted concepts
    Search(SearchArgs),

    /// Show one concept in full
    Show(ShowArgs),

    /// List books and their concept counts
    Books,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Book id from the configuration file
    pub book: String,

    /// Maximum number of sessions to run
    #[arg(short, long, default_value_t = 1)]
    pub sessions: usize,

    /// Read this document instead of the configured one
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Override the configured LLM model
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Book id from the configuration file
    pub book: String,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Text to look for in topics, explanations and syntax
    pub query: String,

    /// Restrict results to one book
    #[arg(short, long)]
    pub book: Option<String>,

    /// Match against concept topics only
    #[arg(short, long)]
    pub topic: bool,

    /// Maximum number of results
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Concept id (e.g. kr_012_pointer_arithmetic)
    pub id: String,
}
