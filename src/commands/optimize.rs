//! # Optimize Command Implementation
//!
//! Runs `git gc` in every cached working tree and removes staging leftovers
//! from interrupted runs. Working trees are never removed or moved, so this
//! can run while other `nix-path` processes use the cache.

use anyhow::Result;

use nix_path::cache::CacheLayout;
use nix_path::repository::RevisionCache;

/// Execute the `optimize` command.
pub fn execute(layout: &CacheLayout) -> Result<()> {
    let cache = RevisionCache::new(layout.clone());
    let summary = cache.optimize()?;

    println!(
        "Compacted {} working tree(s), {} failed; removed {} stale staging entr{}",
        summary.compacted,
        summary.failed,
        summary.swept,
        if summary.swept == 1 { "y" } else { "ies" }
    );
    Ok(())
}
