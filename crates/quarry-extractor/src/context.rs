//! Book context detection
//!
//! The structuring prompt is tailored to the kind of book being mined, so a
//! linking book yields relocation concepts rather than `printf` tutorials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subject area of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookContext {
    /// C language books
    #[default]
    CProgramming,
    /// Linking and loading
    LinkersLoaders,
    /// UNIX system programming
    UnixProgramming,
    /// Operating system internals
    OperatingSystems,
}

const LINKING_TERMS: &[&str] = &[
    "linker",
    "loader",
    "object file",
    "symbol table",
    "relocation",
    "dynamic linking",
];
const UNIX_TERMS: &[&str] = &["system call", "unix", "posix", "file descriptor", "process"];
const OS_TERMS: &[&str] = &["scheduler", "virtual memory", "file system", "thread"];

impl BookContext {
    /// Detect the context from the book title, falling back to the content
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_extractor::BookContext;
    ///
    /// let ctx = BookContext::detect("Advanced Programming in the UNIX Environment", "");
    /// assert_eq!(ctx, BookContext::UnixProgramming);
    /// assert_eq!(BookContext::detect("", "int x;"), BookContext::CProgramming);
    /// ```
    pub fn detect(title: &str, content: &str) -> Self {
        let title = title.to_lowercase();
        if title.contains("linkers") || title.contains("loaders") {
            return BookContext::LinkersLoaders;
        }
        if title.contains("unix") || title.contains("environment") {
            return BookContext::UnixProgramming;
        }
        if title.contains("operating") || title.contains("three easy pieces") {
            return BookContext::OperatingSystems;
        }
        if title.contains("kernighan") || title.contains("ritchie") {
            return BookContext::CProgramming;
        }

        let content = content.to_lowercase();
        let mentions = |terms: &[&str]| terms.iter().any(|t| content.contains(t));
        if mentions(LINKING_TERMS) {
            BookContext::LinkersLoaders
        } else if mentions(UNIX_TERMS) {
            BookContext::UnixProgramming
        } else if mentions(OS_TERMS) {
            BookContext::OperatingSystems
        } else {
            BookContext::CProgramming
        }
    }

    /// Stable identifier, as stored in concept metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            BookContext::CProgramming => "c_programming",
            BookContext::LinkersLoaders => "linkers_loaders",
            BookContext::UnixProgramming => "unix_programming",
            BookContext::OperatingSystems => "operating_systems",
        }
    }

    /// Subject name used in prompts
    pub fn subject(&self) -> &'static str {
        match self {
            BookContext::CProgramming => "C programming",
            BookContext::LinkersLoaders => "linking and loading",
            BookContext::UnixProgramming => "UNIX system programming",
            BookContext::OperatingSystems => "operating systems",
        }
    }

    /// What to extract from books of this kind
    pub fn focus(&self) -> &'static str {
        match self {
            BookContext::CProgramming => {
                "Focus on C language features, syntax, the standard library and programming techniques."
            }
            BookContext::LinkersLoaders => {
                "Focus on program linking and loading: object files, symbol resolution, relocation, \
                 dynamic libraries and binary formats."
            }
            BookContext::UnixProgramming => {
                "Focus on UNIX system calls, process management, file descriptors, signals and IPC. \
                 Skip basic C language tutorials."
            }
            BookContext::OperatingSystems => {
                "Focus on operating system mechanisms: scheduling, virtual memory, file system \
                 implementation and synchronization. Skip basic programming constructs."
            }
        }
    }

    /// What the example program should demonstrate
    pub fn example_kind(&self) -> &'static str {
        match self {
            BookContext::CProgramming => {
                "a complete, compilable C program demonstrating the language concept"
            }
            BookContext::LinkersLoaders => {
                "code demonstrating the linking or loading concept, or object file analysis"
            }
            BookContext::UnixProgramming => "code exercising the relevant UNIX system calls",
            BookContext::OperatingSystems => {
                "code demonstrating the OS mechanism or the system calls that expose it"
            }
        }
    }
}

impl fmt::Display for BookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c_programming" => Ok(BookContext::CProgramming),
            "linkers_loaders" => Ok(BookContext::LinkersLoaders),
            "unix_programming" => Ok(BookContext::UnixProgramming),
            "operating_systems" => Ok(BookContext::OperatingSystems),
            other => Err(format!("Unknown book context: {}", other)),
        }
    }
}
