//! Phase 1: Collection
//!
//! Turns every source into an entry list. Sources are returned in override
//! order: the environment first, then path files, then inline entries.

use log::debug;

use super::Sources;
use crate::entry::{self, NixPathEntry};
use crate::error::Result;
use crate::path::resolve_against;
use crate::pathfile;

/// Execute Phase 1: parse each source into its own entry list.
pub fn execute(sources: &Sources) -> Result<Vec<Vec<NixPathEntry>>> {
    let mut collected = Vec::new();

    if let Some(env) = &sources.env {
        let entries = entry::parse_search_path(env, &sources.cwd)?;
        debug!("NIX_PATH contributed {} entries", entries.len());
        collected.push(entries);
    }

    for file in &sources.files {
        let file = resolve_against(&sources.cwd, file);
        let entries = pathfile::load_entries(&file)?;
        debug!("{} contributed {} entries", file.display(), entries.len());
        collected.push(entries);
    }

    for include in &sources.includes {
        collected.push(entry::parse_search_path(include, &sources.cwd)?);
    }

    Ok(collected)
}
