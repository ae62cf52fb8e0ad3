//! # Manifest Command Implementation
//!
//! Resolves the search path, writes its manifest under the cache's `tmp/`
//! directory and prints the manifest's location. The manifest is a path
//! file, so it can be fed back with `-f` to reproduce the same search path.

use anyhow::Result;
use clap::Args;

use nix_path::cache::CacheLayout;

use super::SourceArgs;

/// Write the manifest and print its path
#[derive(Args, Debug)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Execute the `manifest` command.
pub fn execute(args: ManifestArgs, layout: &CacheLayout) -> Result<()> {
    let search_path = super::build(args.sources, layout)?;
    println!("{}", search_path.manifest.display());
    Ok(())
}
