//! # nix-path
//!
//! This library builds `NIX_PATH` values from several sources and pins every
//! git-backed entry to an immutable, commit-keyed working tree. It is used by
//! the `nix-path` command-line tool but can be embedded in other tools that
//! need reproducible Nix search paths.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use nix_path::cache::CacheLayout;
//! use nix_path::entry::{parse_search_path, render};
//! use nix_path::merge::{merge, promote};
//!
//! let env = parse_search_path("nixpkgs=/old:/roots", Path::new("/work")).unwrap();
//! let extra = parse_search_path("channels.nixpkgs=/new", Path::new("/work")).unwrap();
//!
//! let merged = merge(env, extra);
//! let promoted = promote(merged, &["channels".to_string()]).unwrap();
//!
//! let layout = CacheLayout::new("/tmp/nix-path-cache");
//! assert_eq!(
//!     render(&promoted, &layout).unwrap(),
//!     "nixpkgs=/new:channels.nixpkgs=/new:/roots"
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Targets (`target`)**: what an entry points at, a local directory or a
//!   revision of a git repository (`<locator>;rev=<selector>`).
//! - **Entries (`entry`)**: keyed (`key=target`) and root (`target`) search
//!   path elements, and conversion to and from the `:`-separated string.
//! - **Path files (`pathfile`)**: a small subset of the Nix language that
//!   describes entries as an attribute set, with `import` support.
//! - **Merging (`merge`)**: later sources override earlier ones by key;
//!   promotion hoists keys out of a prefix.
//! - **Revision cache (`repository`, `cache`, `git`)**: fetches repository
//!   targets into `worktrees/<commit>` with stage-then-rename installs that
//!   are safe under concurrent processes.
//! - **Manifests (`manifest`)**: content-addressed records of the final entry
//!   list.
//!
//! ## Execution Flow
//!
//! `phases::orchestrator::execute` collects the sources, merges and promotes
//! them, resolves repository targets, writes the manifest, and renders the
//! final string.

pub mod cache;
pub mod defaults;
pub mod entry;
pub mod error;
pub mod git;
pub mod manifest;
pub mod merge;
pub mod path;
pub mod pathfile;
pub mod phases;
pub mod repository;
pub mod suggestions;
pub mod target;

#[cfg(test)]
mod merge_proptest;
