//! On-disk cache layout
//!
//! The on-disk cache has two directories under one root:
//!
//! - `worktrees/<commit>`: one working tree per resolved commit, immutable
//!   once it appears;
//! - `tmp/`: staging area for atomic installs, and the home of manifests.
//!
//! Nothing in `worktrees/` is ever written in place. Every install is built
//! under `tmp/` and renamed into place in one step, so any process that sees
//! a commit directory sees a complete one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::target::CommitId;

const WORKTREE_DIR: &str = "worktrees";
const STAGING_DIR: &str = "tmp";

/// Prefix of every staged, not-yet-installed artifact under `tmp/`.
pub const STAGING_PREFIX: &str = ".stage-";

/// Where the revision cache and manifests live.
///
/// Built once per run and passed explicitly to everything that touches the
/// cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    worktrees: PathBuf,
    staging: PathBuf,
}

impl CacheLayout {
    /// Describe the layout under `root` without touching the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            worktrees: root.join(WORKTREE_DIR),
            staging: root.join(STAGING_DIR),
        }
    }

    /// Create both directories if they are missing.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.worktrees)?;
        fs::create_dir_all(&self.staging)?;
        Ok(())
    }

    pub fn worktree_dir(&self) -> &Path {
        &self.worktrees
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging
    }

    /// Canonical location of the working tree for `commit`.
    pub fn worktree_path(&self, commit: &CommitId) -> PathBuf {
        self.worktrees.join(commit.as_str())
    }
}

/// Memo key: a repository locator plus the selector as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub locator: String,
    pub selector: String,
}

impl CacheKey {
    pub fn new(locator: &str, selector: &str) -> Self {
        Self {
            locator: locator.to_string(),
            selector: selector.to_string(),
        }
    }
}
