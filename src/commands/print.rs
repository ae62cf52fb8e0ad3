//! # Print Command Implementation
//!
//! Prints the computed search path, or with `--manifest` the path of the
//! manifest recording it, to stdout.

use anyhow::Result;
use clap::Args;

use nix_path::cache::CacheLayout;

use super::SourceArgs;

/// Print the computed NIX_PATH
#[derive(Args, Debug)]
pub struct PrintArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print the manifest path instead of the search path.
    #[arg(long)]
    pub manifest: bool,
}

/// Execute the `print` command.
pub fn execute(args: PrintArgs, layout: &CacheLayout) -> Result<()> {
    let search_path = super::build(args.sources, layout)?;
    if args.manifest {
        println!("{}", search_path.manifest.display());
    } else {
        println!("{}", search_path.rendered);
    }
    Ok(())
}
