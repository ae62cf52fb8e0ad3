//! # Revision Cache
//!
//! This module provides the `RevisionCache`, which turns repository targets
//! into working trees on disk. Each working tree is keyed by the commit it
//! holds, created once, and never modified afterwards, so the rendered path
//! of a resolved target always addresses immutable content.
//!
//! ## Design
//!
//! Git plumbing sits behind the `GitOperations` trait. The main application
//! uses `DefaultGitOperations`, which shells out to `git`; tests swap in mock
//! implementations that fabricate working trees without touching the network.
//!
//! ## Concurrency
//!
//! Several `nix-path` processes may share one cache. There are no locks:
//! every working tree is fetched into a uniquely named directory under the
//! staging area and then renamed into `worktrees/<commit>` in one step. A
//! process that loses the race for a commit discards its own copy and uses
//! the winner's. Readers only ever see complete trees, and a process killed
//! mid-fetch leaves nothing behind under a canonical name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};

use crate::cache::{CacheKey, CacheLayout, STAGING_PREFIX};
use crate::error::{Error, Result};
use crate::target::{CommitId, PathTarget, Revision};

/// How old a staging leftover must be before `optimize` removes it.
pub const STAGING_GRACE: Duration = Duration::from_secs(24 * 60 * 60);

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Fetch `revision` of `locator` into `target_dir` as a checked-out
    /// working tree and return the concrete commit.
    fn fetch(&self, locator: &str, revision: &Revision, target_dir: &Path) -> Result<CommitId>;

    /// Reclaim storage in the repository at `dir` without changing its
    /// checked-out files.
    fn compact(&self, dir: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn fetch(&self, locator: &str, revision: &Revision, target_dir: &Path) -> Result<CommitId> {
        crate::git::fetch(locator, revision, target_dir)
    }

    fn compact(&self, dir: &Path) -> Result<()> {
        crate::git::gc(dir)
    }
}

/// A repository revision materialized in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub commit: CommitId,
    pub path: PathBuf,
}

/// What an `optimize` pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeSummary {
    /// Working trees whose object store was compacted.
    pub compacted: usize,
    /// Working trees whose compaction failed (left untouched).
    pub failed: usize,
    /// Abandoned staging artifacts removed.
    pub swept: usize,
}

/// Resolves repository targets to commit-keyed working trees.
pub struct RevisionCache {
    layout: CacheLayout,
    git_ops: Box<dyn GitOperations>,
    /// Commits already fetched this run, by `(locator, selector)`.
    resolved: RefCell<HashMap<CacheKey, CommitId>>,
}

impl RevisionCache {
    /// Creates a new `RevisionCache` over `layout` using the system `git`.
    pub fn new(layout: CacheLayout) -> Self {
        Self::with_operations(layout, Box::new(DefaultGitOperations))
    }

    /// Creates a `RevisionCache` with a custom `GitOperations` implementation.
    pub fn with_operations(layout: CacheLayout, git_ops: Box<dyn GitOperations>) -> Self {
        Self {
            layout,
            git_ops,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Resolve `revision` of `locator` to a commit and its working tree.
    ///
    /// A resolved revision whose tree is already cached returns at once.
    /// Anything else is fetched (at most once per run for a given
    /// locator/selector pair) and installed atomically.
    pub fn resolve(&self, locator: &str, revision: &Revision) -> Result<Resolution> {
        if let Revision::Resolved(commit) = revision {
            let path = self.layout.worktree_path(commit);
            if path.is_dir() {
                debug!("cache hit for {} at {}", locator, commit);
                return Ok(Resolution {
                    commit: commit.clone(),
                    path,
                });
            }
        }

        let key = CacheKey::new(locator, revision.selector());
        let memoized = self.resolved.borrow().get(&key).cloned();
        let commit = match memoized {
            Some(commit) => commit,
            None => {
                let commit = self.install(locator, revision)?;
                self.resolved.borrow_mut().insert(key, commit.clone());
                commit
            }
        };
        let path = self.layout.worktree_path(&commit);
        Ok(Resolution { commit, path })
    }

    /// Resolve a repository target, returning the same target pinned to the
    /// concrete commit.
    pub fn resolve_target(&self, target: &PathTarget) -> Result<PathTarget> {
        match target {
            PathTarget::Repository { locator, revision } => {
                let resolution = self.resolve(locator, revision)?;
                Ok(PathTarget::repository(
                    locator.clone(),
                    Revision::Resolved(resolution.commit),
                ))
            }
            PathTarget::Local(_) => Err(Error::NotARepository {
                target: target.to_string(),
            }),
        }
    }

    /// Fetch into the staging area and rename into place.
    fn install(&self, locator: &str, revision: &Revision) -> Result<CommitId> {
        self.layout.ensure()?;

        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(self.layout.staging_dir())?;

        info!("fetching {} at {}", locator, revision.selector());
        let commit = self.git_ops.fetch(locator, revision, staged.path())?;
        let final_path = self.layout.worktree_path(&commit);

        if final_path.is_dir() {
            debug!(
                "{} already cached, discarding staged copy {}",
                commit,
                staged.path().display()
            );
            return Ok(commit);
        }

        make_readable(staged.path())?;

        match fs::rename(staged.path(), &final_path) {
            Ok(()) => {
                info!("installed {} at {}", commit, final_path.display());
                Ok(commit)
            }
            Err(_) if final_path.is_dir() => {
                warn!(
                    "another process installed {} first, using its copy",
                    commit
                );
                Ok(commit)
            }
            Err(e) => Err(e.into()),
        }
        // `staged` drops here; once renamed, its path is gone and the cleanup
        // is a no-op.
    }

    /// Compact every cached working tree in place and sweep abandoned staging
    /// artifacts older than [`STAGING_GRACE`].
    ///
    /// No working tree is removed or moved, and no lock is taken, so this is
    /// safe to run next to other processes resolving revisions.
    pub fn optimize(&self) -> Result<OptimizeSummary> {
        self.optimize_with_grace(STAGING_GRACE)
    }

    /// [`RevisionCache::optimize`] with an explicit staging grace period.
    pub fn optimize_with_grace(&self, grace: Duration) -> Result<OptimizeSummary> {
        self.layout.ensure()?;
        let mut summary = OptimizeSummary::default();

        for entry in fs::read_dir(self.layout.worktree_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            match self.git_ops.compact(&path) {
                Ok(()) => {
                    debug!("compacted {}", path.display());
                    summary.compacted += 1;
                }
                Err(e) => {
                    warn!("failed to compact {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        summary.swept = sweep_staging(self.layout.staging_dir(), grace)?;
        Ok(summary)
    }
}

/// Working trees are shared read-only with whoever evaluates the search path;
/// staging directories start out private to the owner.
fn make_readable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Remove staging artifacts last modified more than `grace` ago.
fn sweep_staging(staging: &Path, grace: Duration) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(grace)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0;

    for entry in fs::read_dir(staging)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        if metadata.modified()? > cutoff {
            continue;
        }

        let result = if metadata.is_dir() {
            fs::remove_dir_all(entry.path())
        } else {
            fs::remove_file(entry.path())
        };
        match result {
            Ok(()) => {
                debug!("swept {}", entry.path().display());
                removed += 1;
            }
            // Someone else swept it first.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(removed)
}
