//! Path manipulation utilities for nix-path
//!
//! Paths coming from path files and search-path strings are resolved
//! lexically: nothing here touches the filesystem, because entries may name
//! directories that do not exist yet (or never will on this machine).

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` or `~/` to the home directory.
///
/// `~user` syntax is left untouched, as is any path when the home directory
/// cannot be determined.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// A `..` that would climb above the root of an absolute path is dropped; in
/// a relative path, leading `..` components are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Resolve `path` against `base` unless it is already absolute, then
/// normalize the result.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        normalize(&base.join(expanded))
    }
}
