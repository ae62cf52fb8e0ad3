//! # Search-Path Entries
//!
//! A `NIX_PATH` value is a `:`-separated list of elements, each either
//! `key=target` (a keyed entry, looked up as `<key>` or `<key/sub/path>` by
//! Nix) or a bare `target` (a root entry, searched for any `<name>`).
//!
//! This module converts between that string form and [`NixPathEntry`]
//! values. Parsing handles the one ambiguity in the format the way Nix does:
//! a `:` directly followed by `//` belongs to a URL scheme and does not end
//! the element.

use std::path::{Path, PathBuf};

use crate::cache::CacheLayout;
use crate::error::{Error, Result};
use crate::target::{self, PathTarget, Revision};

/// Separator between rendered search-path elements.
pub const SEPARATOR: char = ':';

/// One element of a search path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NixPathEntry {
    Keyed(String, PathTarget),
    Root(PathTarget),
}

impl NixPathEntry {
    pub fn keyed(key: impl Into<String>, target: PathTarget) -> Self {
        NixPathEntry::Keyed(key.into(), target)
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            NixPathEntry::Keyed(key, _) => Some(key),
            NixPathEntry::Root(_) => None,
        }
    }

    pub fn target(&self) -> &PathTarget {
        match self {
            NixPathEntry::Keyed(_, target) | NixPathEntry::Root(target) => target,
        }
    }

    /// Replace the target, keeping the key (if any).
    pub fn with_target(self, target: PathTarget) -> Self {
        match self {
            NixPathEntry::Keyed(key, _) => NixPathEntry::Keyed(key, target),
            NixPathEntry::Root(_) => NixPathEntry::Root(target),
        }
    }

    /// Render this entry against the cache layout.
    ///
    /// Repository targets must already carry a resolved commit.
    pub fn render(&self, layout: &CacheLayout) -> Result<String> {
        let path = render_target(self.target(), layout)?;
        Ok(match self {
            NixPathEntry::Keyed(key, _) => format!("{}={}", key, path.display()),
            NixPathEntry::Root(_) => path.display().to_string(),
        })
    }
}

/// Whether `key` is usable as the key of a keyed element.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

/// The filesystem path a target stands for once resolved.
pub fn render_target(target: &PathTarget, layout: &CacheLayout) -> Result<PathBuf> {
    match target {
        PathTarget::Local(path) => Ok(path.clone()),
        PathTarget::Repository {
            revision: Revision::Resolved(commit),
            ..
        } => Ok(layout.worktree_path(commit)),
        PathTarget::Repository {
            revision: Revision::Symbolic(_),
            ..
        } => Err(Error::UnresolvedTarget {
            target: target.to_string(),
        }),
    }
}

/// Render a whole entry list into a search-path string.
pub fn render(entries: &[NixPathEntry], layout: &CacheLayout) -> Result<String> {
    let rendered = entries
        .iter()
        .map(|entry| entry.render(layout))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(&SEPARATOR.to_string()))
}

/// Split a search-path string into its raw elements.
///
/// Empty elements are dropped.
pub fn split_search_path(value: &str) -> Vec<&str> {
    let mut elements = Vec::new();
    let mut start = 0;
    for (index, _) in value.match_indices(SEPARATOR) {
        if value[index + 1..].starts_with("//") {
            continue;
        }
        elements.push(&value[start..index]);
        start = index + 1;
    }
    elements.push(&value[start..]);
    elements.retain(|element| !element.trim().is_empty());
    elements
}

/// Parse one search-path element; relative local targets are anchored at
/// `base`.
pub fn parse_element(element: &str, base: &Path) -> Result<NixPathEntry> {
    let element = element.trim();
    let keyed = element
        .split_once('=')
        .filter(|(key, _)| is_valid_key(key));

    let entry = match keyed {
        Some((key, raw_target)) => {
            if raw_target.trim().is_empty() {
                return Err(Error::SearchPathParse {
                    input: element.to_string(),
                    message: format!("key '{}' has no target", key),
                });
            }
            NixPathEntry::keyed(key, target::parse(raw_target)?)
        }
        None => NixPathEntry::Root(target::parse(element)?),
    };

    let target = entry.target().clone().relative_to(base);
    Ok(entry.with_target(target))
}

/// Parse a full search-path string, such as the inherited `NIX_PATH`.
pub fn parse_search_path(value: &str, base: &Path) -> Result<Vec<NixPathEntry>> {
    split_search_path(value)
        .into_iter()
        .map(|element| parse_element(element, base))
        .collect()
}
