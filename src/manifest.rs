//! # Manifests
//!
//! A manifest records a final entry list as a path file, named by the
//! SHA-256 of its own bytes and stored under the cache's `tmp/` directory.
//! Identical entry lists always map to the same file, which is written at
//! most once and never modified afterwards.
//!
//! ```nix
//! # root: /opt/roots
//! {
//!   "nixpkgs" = "https://github.com/NixOS/nixpkgs;rev=<commit>";
//!   "overlays" = /home/user/overlays;
//! }
//! ```
//!
//! Root entries have no attribute name, so they are recorded as comments.
//! They still change the hash, and the file still evaluates to a mapping.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};

use crate::cache::{CacheLayout, STAGING_PREFIX};
use crate::entry::NixPathEntry;
use crate::error::Result;
use crate::target::PathTarget;

/// Extension of manifest files.
pub const MANIFEST_EXTENSION: &str = "nix";

/// Write `entries` as a manifest and return its path.
pub fn write(layout: &CacheLayout, entries: &[NixPathEntry]) -> Result<PathBuf> {
    let content = serialize(entries);
    let hash = hex::encode(Sha256::digest(content.as_bytes()));

    layout.ensure()?;
    let path = layout
        .staging_dir()
        .join(format!("{}.{}", hash, MANIFEST_EXTENSION));

    if path.is_file() {
        debug!("reusing manifest {}", path.display());
        return Ok(path);
    }

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(layout.staging_dir())?;
    staged.write_all(content.as_bytes())?;
    staged.flush()?;
    make_readable(staged.path())?;

    match staged.persist_noclobber(&path) {
        Ok(_) => debug!("wrote manifest {}", path.display()),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!("manifest {} written concurrently", path.display());
        }
        Err(e) => return Err(e.error.into()),
    }
    Ok(path)
}

/// Render `entries` in path-file syntax.
pub fn serialize(entries: &[NixPathEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        if let NixPathEntry::Root(target) = entry {
            out.push_str(&format!("# root: {}\n", target));
        }
    }

    out.push_str("{\n");
    for entry in entries {
        if let NixPathEntry::Keyed(key, target) = entry {
            out.push_str(&format!("  {} = {};\n", quote(key), value(target)));
        }
    }
    out.push_str("}\n");
    out
}

fn value(target: &PathTarget) -> String {
    match target {
        PathTarget::Local(path) if is_path_literal(path) => path.display().to_string(),
        other => quote(&other.to_string()),
    }
}

/// Whether `path` can be written as a bare path literal.
fn is_path_literal(path: &Path) -> bool {
    let Some(text) = path.to_str() else {
        return false;
    };
    text.len() > 1
        && text.starts_with('/')
        && !text.ends_with('/')
        && !text.starts_with("/*")
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '/'))
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Manifests are handed to other users' Nix evaluations; temp files start
/// out owner-only.
fn make_readable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
