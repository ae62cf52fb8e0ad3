//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("paths.nix", "{ a = ./a; }");
//!     fixture.command().args(["print", "-f", "paths.nix"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::pathfiles;
    #[allow(unused_imports)]
    pub use super::GitRepo;
    pub use super::TestFixture;
}

/// Common path-file snippets for testing.
#[allow(dead_code)]
pub mod pathfiles {
    /// Two local entries.
    pub const LOCAL: &str = r#"{
  nixpkgs = ./nixpkgs;
  overlays = "./overlays";
}
"#;

    /// Entries nested under `channels`.
    pub const CHANNELS: &str = r#"{
  channels = {
    nixpkgs = ./channels/nixpkgs;
    home-manager = ./channels/home-manager;
  };
}
"#;

    /// Not a mapping at the top level.
    pub const NOT_A_SET: &str = "./just-a-path\n";

    /// Unterminated attribute set.
    pub const SYNTAX_ERROR: &str = "{ nixpkgs = ./nixpkgs;\n";
}

/// A temporary working directory plus a private cache root.
///
/// Commands created by the fixture run inside the working directory, use the
/// private cache, and see neither the caller's `NIX_PATH` nor `RUST_LOG`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create an empty directory.
    #[allow(dead_code)]
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The cache root used by [`TestFixture::command`].
    pub fn cache_root(&self) -> PathBuf {
        self.temp_dir.path().join(".cache")
    }

    /// Where the working tree for `commit` lands.
    #[allow(dead_code)]
    pub fn worktree(&self, commit: &str) -> PathBuf {
        self.cache_root().join("worktrees").join(commit)
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("nix-path");
        cmd.current_dir(self.path())
            .env("NIX_PATH_CACHE", self.cache_root())
            .env_remove("NIX_PATH")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway git repository with a `main` branch.
#[allow(dead_code)]
pub struct GitRepo {
    path: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    /// Initialize a repository at `path` with one commit on `main`.
    pub fn init(path: impl Into<PathBuf>) -> Self {
        let repo = Self { path: path.into() };
        std::fs::create_dir_all(&repo.path).expect("Failed to create repository dir");
        repo.git(&["init", "--quiet"]);
        repo.git(&["checkout", "--quiet", "-b", "main"]);
        repo.commit("default.nix", "{ }\n", "initial");
        repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `file` and commit it; returns the new commit id.
    pub fn commit(&self, file: &str, content: &str, message: &str) -> String {
        std::fs::write(self.path.join(file), content).expect("Failed to write file");
        self.git(&["add", file]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("paths.nix", pathfiles::LOCAL);
        assert!(fixture.path().join("paths.nix").exists());
    }

    #[test]
    fn test_fixture_cache_is_private() {
        let fixture = TestFixture::new();
        assert!(fixture.cache_root().starts_with(fixture.path()));
    }
}
