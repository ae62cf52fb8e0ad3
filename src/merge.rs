//! # Merging and Promotion
//!
//! Search-path sources are combined with [`merge`]: entries from the incoming
//! list come first and win on key collision, entries from the base list fill
//! in keys the incoming list does not define. Root entries carry no key and
//! are never deduplicated, even when two of them are identical; Nix treats
//! each one as a separate directory to search, and that behaviour is kept.
//!
//! [`promote`] hoists a group of keyed entries to the top level by stripping
//! a key prefix: with prefix `channels`, `channels.nixpkgs=...` also becomes
//! `nixpkgs=...`, overriding any `nixpkgs` entry already present.

use std::collections::HashSet;

use crate::entry::NixPathEntry;
use crate::error::{Error, Result};

/// Separator between the components of a key.
pub const KEY_SEPARATOR: char = '.';

/// Combine two entry lists, letting `incoming` override `base`.
///
/// The result is `incoming` followed by `base`, keeping only the first
/// occurrence of each key. Every root entry is kept.
pub fn merge(base: Vec<NixPathEntry>, incoming: Vec<NixPathEntry>) -> Vec<NixPathEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    incoming
        .into_iter()
        .chain(base)
        .filter(|entry| match entry.key() {
            Some(key) => seen.insert(key.to_string()),
            None => true,
        })
        .collect()
}

/// Fold sources left to right, each later source overriding earlier ones.
pub fn merge_all<I>(sources: I) -> Vec<NixPathEntry>
where
    I: IntoIterator<Item = Vec<NixPathEntry>>,
{
    sources.into_iter().fold(Vec::new(), merge)
}

/// Normalize requested prefixes: longest first, each ending in the key
/// separator so `a` never matches `ab`.
pub fn prepare_prefixes(prefixes: &[String]) -> Result<Vec<String>> {
    let mut prepared = prefixes
        .iter()
        .map(|prefix| {
            let trimmed = prefix.trim();
            if trimmed.trim_end_matches(KEY_SEPARATOR).is_empty() {
                return Err(Error::InvalidPrefix {
                    prefix: prefix.clone(),
                    message: "prefix must name at least one key component".to_string(),
                });
            }
            if trimmed.ends_with(KEY_SEPARATOR) {
                Ok(trimmed.to_string())
            } else {
                Ok(format!("{}{}", trimmed, KEY_SEPARATOR))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    // Stable, so equal-length prefixes keep the order they were given in.
    prepared.sort_by(|a, b| b.len().cmp(&a.len()));
    Ok(prepared)
}

/// Promote keyed entries whose key starts with one of `prefixes`.
///
/// Every matching (entry, prefix) pair yields an entry keyed by the remainder
/// of the key, so one entry under several nested requested prefixes is
/// promoted once per prefix. Promoted entries override the originals.
pub fn promote(entries: Vec<NixPathEntry>, prefixes: &[String]) -> Result<Vec<NixPathEntry>> {
    if prefixes.is_empty() {
        return Ok(entries);
    }
    let prefixes = prepare_prefixes(prefixes)?;

    let promoted: Vec<NixPathEntry> = entries
        .iter()
        .filter_map(|entry| match entry {
            NixPathEntry::Keyed(key, target) => Some((key, target)),
            NixPathEntry::Root(_) => None,
        })
        .flat_map(|(key, target)| {
            prefixes.iter().filter_map(move |prefix| {
                key.strip_prefix(prefix.as_str())
                    .map(|rest| NixPathEntry::keyed(rest, target.clone()))
            })
        })
        .collect();

    Ok(merge(entries, promoted))
}
