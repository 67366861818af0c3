//! Quarry CLI library.
//!
//! Configuration, command execution and output formatting for the `quarry`
//! binary, which runs extraction sessions over configured books and queries
//! the resulting concept files.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
