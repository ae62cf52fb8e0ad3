//! Orchestrator for building a search path
//!
//! Runs the phases in order and finishes the run: the resolved entries are
//! recorded in a manifest and rendered into the `NIX_PATH` string.

use log::info;

use super::{collect, resolve, SearchPath, Sources};
use crate::entry;
use crate::error::Result;
use crate::manifest;
use crate::merge;
use crate::repository::RevisionCache;

/// Build the search path described by `sources`.
///
/// 1. Collect every source into an entry list
/// 2. Merge the lists in order and promote the requested prefixes
/// 3. Resolve repository targets through `cache`
/// 4. Write the manifest and render the final string
pub fn execute(sources: &Sources, cache: &RevisionCache) -> Result<SearchPath> {
    // Phase 1: Collection
    let collected = collect::execute(sources)?;

    // Phase 2: Merging and promotion
    let merged = merge::merge_all(collected);
    let promoted = merge::promote(merged, &sources.promote)?;

    // Phase 3: Resolution
    let entries = resolve::execute(promoted, cache)?;

    let manifest = manifest::write(cache.layout(), &entries)?;
    let rendered = entry::render(&entries, cache.layout())?;
    info!(
        "search path has {} entries, manifest {}",
        entries.len(),
        manifest.display()
    );

    Ok(SearchPath {
        entries,
        rendered,
        manifest,
    })
}
