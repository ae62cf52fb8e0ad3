//! Phases of building a search path.
//!
//! ## Overview
//!
//! 1. Collection - parse every source (environment, path files, inline
//!    entries) into its own entry list
//! 2. Merging and promotion - fold the lists in source order, then hoist the
//!    requested key prefixes
//! 3. Resolution - pin every repository target to a commit, fetching and
//!    installing working trees as needed
//!
//! The orchestrator then writes the manifest and renders the final string.
//! Each phase only depends on the ones before it and on the foundation
//! modules (`entry`, `target`, `merge`, `repository`).

use std::path::PathBuf;

use crate::entry::NixPathEntry;

pub mod collect;
pub mod orchestrator;
pub mod resolve;

/// Inputs of one run, in override order.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// The inherited `NIX_PATH`, if it is to be used.
    pub env: Option<String>,
    /// Path files, each overriding the ones before it.
    pub files: Vec<PathBuf>,
    /// Inline search-path strings, applied last.
    pub includes: Vec<String>,
    /// Key prefixes to promote after merging.
    pub promote: Vec<String>,
    /// Base for relative targets in `env` and `includes` and for relative
    /// path-file names.
    pub cwd: PathBuf,
}

/// The outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    /// Final entries, every repository target resolved.
    pub entries: Vec<NixPathEntry>,
    /// The `NIX_PATH` value.
    pub rendered: String,
    /// Manifest recording `entries`.
    pub manifest: PathBuf,
}
