//! # Path Targets
//!
//! A path target is what a search-path entry points at: either a local
//! directory, or a revision of a git repository that has to be materialized
//! before it can be used.
//!
//! ## Grammar
//!
//! ```text
//! <repository-locator>[;rev=<revision-selector>]   repository target
//! <filesystem-path>                                local target
//! ```
//!
//! A string is treated as a repository target when it carries a `;`
//! parameter section, has a URL scheme (`https://`, `ssh://`, `file://`, ...),
//! is an scp-like locator (`git@github.com:owner/repo.git`), or its locator
//! ends in `.git`. Everything else is a local path. A missing `rev` selects
//! the repository's default reference (`HEAD`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Selector used when a repository target names no revision.
pub const DEFAULT_REVISION: &str = "HEAD";

/// An immutable git object name (lowercase hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    /// Validate and wrap a hex object name as reported by git.
    ///
    /// Abbreviated names are accepted here since git itself may report them;
    /// only full-length names are ever inferred from user input (see
    /// [`Revision::from_selector`]).
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_ascii_lowercase();
        if id.len() < 4 || id.len() > 64 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::TargetParse {
                input: id,
                message: "not a hexadecimal commit id".to_string(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for full SHA-1 (40) and SHA-256 (64) object names.
    fn is_full_length(id: &str) -> bool {
        (id.len() == 40 || id.len() == 64) && id.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A revision selector of a repository target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    /// A branch, tag, or other ref. Mutable upstream.
    Symbolic(String),
    /// A concrete commit. Content-addressable.
    Resolved(CommitId),
}

impl Revision {
    /// Classify a selector string.
    ///
    /// Only full-length hex object names count as resolved; anything else,
    /// including abbreviated hashes, goes through a fetch to learn the commit.
    pub fn from_selector(selector: &str) -> Result<Self> {
        if CommitId::is_full_length(selector) {
            Ok(Revision::Resolved(CommitId::new(selector)?))
        } else {
            Ok(Revision::Symbolic(selector.to_string()))
        }
    }

    /// True for a symbolic selector that could also be an abbreviated
    /// commit id. Servers only answer such ids after a full fetch.
    pub fn may_be_abbreviated_commit(&self) -> bool {
        match self {
            Revision::Symbolic(name) => {
                (4..40).contains(&name.len()) && name.bytes().all(|b| b.is_ascii_hexdigit())
            }
            Revision::Resolved(_) => false,
        }
    }

    /// The selector as it is passed to `git fetch`.
    pub fn selector(&self) -> &str {
        match self {
            Revision::Symbolic(name) => name,
            Revision::Resolved(id) => id.as_str(),
        }
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::Symbolic(DEFAULT_REVISION.to_string())
    }
}

/// Where a search-path entry points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathTarget {
    Local(PathBuf),
    Repository { locator: String, revision: Revision },
}

impl PathTarget {
    pub fn repository(locator: impl Into<String>, revision: Revision) -> Self {
        PathTarget::Repository {
            locator: locator.into(),
            revision,
        }
    }

    pub fn is_repository(&self) -> bool {
        matches!(self, PathTarget::Repository { .. })
    }

    /// Anchor a relative local target at `base`. Repository targets and
    /// absolute paths are returned unchanged.
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            PathTarget::Local(path) => PathTarget::Local(crate::path::resolve_against(base, &path)),
            repository => repository,
        }
    }
}

impl fmt::Display for PathTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTarget::Local(path) => write!(f, "{}", path.display()),
            PathTarget::Repository { locator, revision } => {
                write!(f, "{}", locator)?;
                match revision {
                    Revision::Symbolic(name) if name == DEFAULT_REVISION => Ok(()),
                    other => write!(f, ";rev={}", other.selector()),
                }
            }
        }
    }
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid regex"))
}

fn scp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^/]").expect("valid regex"))
}

fn looks_like_repository(locator: &str) -> bool {
    scheme_regex().is_match(locator)
        || scp_regex().is_match(locator)
        || locator.trim_end_matches('/').ends_with(".git")
}

/// Parse a raw target string.
///
/// Relative local paths are returned as written; callers anchor them at the
/// right base directory with [`PathTarget::relative_to`].
pub fn parse(raw: &str) -> Result<PathTarget> {
    let err = |message: String| Error::TargetParse {
        input: raw.to_string(),
        message,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(err("empty target".to_string()));
    }

    let (locator, params) = match trimmed.split_once(';') {
        Some((locator, params)) => (locator, Some(params)),
        None => (trimmed, None),
    };

    if params.is_none() && !looks_like_repository(locator) {
        return Ok(PathTarget::Local(PathBuf::from(trimmed)));
    }

    if locator.is_empty() {
        return Err(err("missing repository locator".to_string()));
    }
    if scheme_regex().is_match(locator) {
        Url::parse(locator).map_err(|e| err(format!("malformed URL: {}", e)))?;
    }

    let mut selector: Option<&str> = None;
    for param in params.into_iter().flat_map(|p| p.split(';')) {
        let (name, value) = param
            .split_once('=')
            .ok_or_else(|| err(format!("malformed parameter '{}'", param)))?;
        match name {
            "rev" if selector.is_some() => {
                return Err(err("'rev' given more than once".to_string()));
            }
            "rev" if value.is_empty() => {
                return Err(err("empty revision selector".to_string()));
            }
            "rev" => selector = Some(value),
            other => return Err(err(format!("unknown parameter '{}'", other))),
        }
    }

    let revision = match selector {
        Some(selector) => Revision::from_selector(selector)?,
        None => Revision::default(),
    };
    Ok(PathTarget::repository(locator, revision))
}
