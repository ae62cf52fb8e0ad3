//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nix_path::cache::CacheLayout;
use nix_path::defaults::{self, CACHE_ROOT_ENV};

use crate::commands;

/// nix-path - Build NIX_PATH from path files and pinned git revisions
#[derive(Parser, Debug)]
#[command(name = "nix-path")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    /// The root directory for the revision cache and manifests.
    ///
    /// Defaults to the system cache directory (`~/.cache/nix-path` on Linux,
    /// `~/Library/Caches/nix-path` on macOS).
    #[arg(long, global = true, value_name = "DIR", env = CACHE_ROOT_ENV)]
    cache_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program with NIX_PATH set to the computed search path
    Exec(commands::exec::ExecArgs),

    /// Print the computed search path
    Print(commands::print::PrintArgs),

    /// Write the manifest for the computed search path and print its location
    Manifest(commands::manifest::ManifestArgs),

    /// Compact cached working trees and remove abandoned staging files
    Optimize,

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let cache_root = self
            .cache_root
            .clone()
            .unwrap_or_else(defaults::default_cache_root);
        // Rendered entries point into the cache and must survive a chdir.
        let cache_root = std::path::absolute(nix_path::path::expand_tilde(&cache_root))
            .with_context(|| {
                format!("Failed to resolve cache root {}", cache_root.display())
            })?;
        let layout = CacheLayout::new(cache_root);

        match self.command {
            Commands::Exec(args) => commands::exec::execute(args, &layout),
            Commands::Print(args) => commands::print::execute(args, &layout),
            Commands::Manifest(args) => commands::manifest::execute(args, &layout),
            Commands::Optimize => commands::optimize::execute(&layout),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// Logs go to stderr; stdout carries only command output.
    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .target(env_logger::Target::Stderr)
            .try_init();
    }
}
