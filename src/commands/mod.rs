//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `nix-path` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! Commands that build a search path share [`SourceArgs`] and [`build`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::warn;

use nix_path::cache::CacheLayout;
use nix_path::defaults::NIX_PATH_ENV;
use nix_path::entry::NixPathEntry;
use nix_path::merge::prepare_prefixes;
use nix_path::phases::{orchestrator, SearchPath, Sources};
use nix_path::repository::RevisionCache;

pub mod completions;
pub mod exec;
pub mod manifest;
pub mod optimize;
pub mod print;

/// Where the search path comes from.
///
/// Sources apply in this order, later ones overriding earlier ones by key:
/// the inherited `NIX_PATH`, every `--file`, every `--include`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path file to read (repeatable, applied in order).
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Search-path element(s) to add, e.g. `nixpkgs=https://github.com/NixOS/nixpkgs;rev=nixos-24.05`
    /// (repeatable, applied after path files).
    #[arg(short = 'I', long = "include", value_name = "ENTRY")]
    pub includes: Vec<String>,

    /// Also expose keys under PREFIX without it (repeatable).
    #[arg(short = 'p', long = "promote", value_name = "PREFIX")]
    pub promote: Vec<String>,

    /// Ignore the inherited NIX_PATH.
    #[arg(long)]
    pub no_env: bool,
}

impl SourceArgs {
    /// Resolve the arguments against the process environment.
    pub fn into_sources(self) -> Result<Sources> {
        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;

        for file in &self.files {
            let resolved = nix_path::path::resolve_against(&cwd, file);
            if !resolved.exists() {
                return Err(nix_path::suggestions::path_file_not_found(&resolved));
            }
        }

        let env = if self.no_env {
            None
        } else {
            std::env::var(NIX_PATH_ENV).ok()
        };

        Ok(Sources {
            env,
            files: self.files,
            includes: self.includes,
            promote: self.promote,
            cwd,
        })
    }
}

/// Build the search path for `args` against the cache at `layout`.
pub fn build(args: SourceArgs, layout: &CacheLayout) -> Result<SearchPath> {
    let sources = args.into_sources()?;
    let cache = RevisionCache::new(layout.clone());
    let search_path = orchestrator::execute(&sources, &cache)?;
    warn_unmatched_prefixes(&sources.promote, &search_path.entries);
    Ok(search_path)
}

fn warn_unmatched_prefixes(prefixes: &[String], entries: &[NixPathEntry]) {
    let Ok(prepared) = prepare_prefixes(prefixes) else {
        return;
    };
    let keys: Vec<&str> = entries.iter().filter_map(NixPathEntry::key).collect();
    for prefix in prepared {
        if !keys.iter().any(|key| key.starts_with(prefix.as_str())) {
            warn!("{}", nix_path::suggestions::unmatched_prefix(&prefix, &keys));
        }
    }
}
