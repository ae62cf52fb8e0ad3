//! Phase 3: Resolution
//!
//! Pins every repository target to the commit it currently names, going
//! through the revision cache. Local targets pass through untouched. The
//! first failure aborts the run.

use crate::entry::NixPathEntry;
use crate::error::Result;
use crate::repository::RevisionCache;

/// Execute Phase 3: resolve repository targets in entry order.
pub fn execute(entries: Vec<NixPathEntry>, cache: &RevisionCache) -> Result<Vec<NixPathEntry>> {
    entries
        .into_iter()
        .map(|entry| {
            if entry.target().is_repository() {
                let target = cache.resolve_target(entry.target())?;
                Ok(entry.with_target(target))
            } else {
                Ok(entry)
            }
        })
        .collect()
}
