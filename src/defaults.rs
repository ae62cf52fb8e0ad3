//! Default values for nix-path configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Environment variable that overrides the cache root.
pub const CACHE_ROOT_ENV: &str = "NIX_PATH_CACHE";

/// Environment variable holding the inherited search path.
pub const NIX_PATH_ENV: &str = "NIX_PATH";

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/nix-path` (XDG Base Directory)
/// - macOS: `~/Library/Caches/nix-path`
///
/// Falls back to `.nix-path-cache/nix-path` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `NIX_PATH_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".nix-path-cache"))
        .join("nix-path")
}
