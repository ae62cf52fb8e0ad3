//! # Error Handling
//!
//! This module defines the centralized error type for `nix-path`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the library can report, each variant carrying the key, input string, file,
//! or locator needed to act on it.
//!
//! The variants fall into three groups:
//!
//! - **Input errors**: malformed target strings, malformed search-path
//!   strings, syntax errors and shape errors in path files, bad promotion
//!   prefixes.
//! - **Resolution errors**: `git` fetch failures and attempts to resolve a
//!   target that is not a repository.
//! - **Internal invariant errors**: rendering a repository target whose
//!   revision was never resolved to a commit.
//!
//! Every error is fatal for the run. Nothing is retried and no partial search
//! path is ever produced.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for nix-path operations
#[derive(Error, Debug)]
pub enum Error {
    /// A target string did not match the target grammar.
    #[error("Invalid target '{input}': {message}")]
    TargetParse { input: String, message: String },

    /// A search-path string (e.g. `NIX_PATH` or an `-I` argument) could not be
    /// split into entries.
    #[error("Invalid search path element '{input}': {message}")]
    SearchPathParse { input: String, message: String },

    /// A path file could not be read.
    #[error("Cannot read path file {}: {source}", path.display())]
    PathFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path file is not syntactically valid.
    #[error("Syntax error in {}:{line}:{column}: {message}", file.display())]
    Syntax {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The top-level value of a path file is not a mapping.
    #[error("Invalid path file {}: expected an attribute set, found {found}", file.display())]
    InvalidPathFile { file: PathBuf, found: String },

    /// A mapping entry is neither a string nor a literal path.
    #[error("Invalid path element '{key}' in {}: expected a string or a path, found {found}", file.display())]
    InvalidPathElement {
        file: PathBuf,
        key: String,
        found: String,
    },

    /// `import` was called with something other than a literal path.
    #[error("Invalid import argument in {}: expected a path, found {found}", file.display())]
    InvalidImportArgument { file: PathBuf, found: String },

    /// The same attribute was defined twice in one path file.
    #[error("Duplicate attribute '{key}' in {}", file.display())]
    DuplicateAttribute { file: PathBuf, key: String },

    /// A promotion prefix is not usable.
    #[error("Invalid promotion prefix '{prefix}': {message}")]
    InvalidPrefix { prefix: String, message: String },

    /// Fetching a revision of a repository failed.
    #[error("Git fetch error for {locator}@{selector}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitFetch {
        locator: String,
        selector: String,
        message: String,
        /// Optional hint for how to resolve the fetch issue
        hint: Option<String>,
    },

    /// A `git` command failed outside of a fetch.
    #[error("Git command failed in {}: {command} - {stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// A non-repository target was handed to the revision cache.
    #[error("Internal error: cannot resolve non-repository target '{target}' through the revision cache")]
    NotARepository { target: String },

    /// A repository target reached rendering without a resolved commit.
    #[error("Internal error: target '{target}' was rendered before its revision was resolved")]
    UnresolvedTarget { target: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
