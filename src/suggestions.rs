//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nix_path::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Path file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::path_file_not_found(path));
//! ```

use std::io;
use std::path::Path;

/// Generate an error for a `--file` argument that does not exist.
pub fn path_file_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Path file not found: {path}\n\n\
         hint: Relative paths are resolved against the current directory\n\
         hint: A path file is a Nix attribute set, e.g. {{ nixpkgs = ./nixpkgs; }}",
        path = path.display()
    )
}

/// Generate an error for a program `exec` could not start.
pub fn program_not_started(program: &str, error: &io::Error) -> anyhow::Error {
    let hint = match error.kind() {
        io::ErrorKind::NotFound => "hint: Check that the program is installed and on PATH",
        io::ErrorKind::PermissionDenied => "hint: Check that the program is executable",
        _ => "hint: Put the program and its arguments after '--'",
    };

    anyhow::anyhow!(
        "Failed to execute '{program}'\n\
         error: {error}\n\n\
         {hint}"
    )
}

/// Hint for a promotion prefix that matched no key.
///
/// Suggests the closest first key component, if any is close enough.
pub fn unmatched_prefix(prefix: &str, keys: &[&str]) -> String {
    let mut components: Vec<&str> = keys
        .iter()
        .filter_map(|key| key.split('.').next())
        .collect();
    components.sort_unstable();
    components.dedup();

    let wanted = prefix.trim_end_matches('.');
    match find_similar(wanted, &components) {
        Some(candidate) => format!(
            "promotion prefix '{wanted}' matched no key\nhint: Did you mean '{candidate}'?"
        ),
        None => format!("promotion prefix '{wanted}' matched no key"),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_len]
}
