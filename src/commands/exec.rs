//! # Exec Command Implementation
//!
//! This module implements the `exec` subcommand: compute the search path,
//! then replace the current process with the given program, its environment
//! unchanged except for `NIX_PATH`.
//!
//! ## Example
//!
//! ```bash
//! nix-path exec -f channels.nix -p channels -- nix-build '<nixpkgs>' -A hello
//! ```

use std::process::Command;

use anyhow::Result;
use clap::Args;
use log::debug;

use nix_path::cache::CacheLayout;
use nix_path::defaults::NIX_PATH_ENV;

use super::SourceArgs;

/// Run a program with the computed NIX_PATH
#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Program to run, followed by its arguments (after `--`).
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Execute the `exec` command.
///
/// On Unix this does not return on success.
pub fn execute(args: ExecArgs, layout: &CacheLayout) -> Result<()> {
    let search_path = super::build(args.sources, layout)?;

    let Some((program, program_args)) = args.command.split_first() else {
        anyhow::bail!("no program given\n\nhint: Put the program and its arguments after '--'");
    };
    debug!("exec {} with NIX_PATH={}", program, search_path.rendered);

    let mut command = Command::new(program);
    command
        .args(program_args)
        .env(NIX_PATH_ENV, &search_path.rendered);

    run(command, program)
}

#[cfg(unix)]
fn run(mut command: Command, program: &str) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let error = command.exec();
    Err(nix_path::suggestions::program_not_started(program, &error))
}

#[cfg(not(unix))]
fn run(mut command: Command, program: &str) -> Result<()> {
    let status = command
        .status()
        .map_err(|error| nix_path::suggestions::program_not_started(program, &error))?;
    std::process::exit(status.code().unwrap_or(1));
}
