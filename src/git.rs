//! Thin wrappers over the system `git` command
//!
//! Using the system git means authentication works the way it does for the
//! user already:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::Error;
use crate::target::{CommitId, Revision};

fn git(dir: &Path) -> Command {
    let mut command = Command::new("git");
    command
        .arg("-C")
        .arg(dir)
        // Never block on a credential prompt; fail instead.
        .env("GIT_TERMINAL_PROMPT", "0");
    command
}

fn run(mut command: Command) -> std::io::Result<Output> {
    debug!("running {:?}", command);
    command.output()
}

/// Commands run with `-C <staging dir>`, so a relative local remote has to be
/// anchored at the invoking directory first.
fn remote_for(locator: &str) -> String {
    let path = Path::new(locator);
    if path.is_relative() && path.exists() {
        if let Ok(absolute) = std::path::absolute(path) {
            return absolute.display().to_string();
        }
    }
    locator.to_string()
}

/// Every branch and tag, so a bare commit id reachable from any of them can
/// be checked out.
const FULL_FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/upstream/*",
    "+refs/tags/*:refs/tags/*",
];

fn fetch_error(locator: &str, revision: &Revision, stderr: &str) -> Error {
    let hint = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository: add your SSH key to \
             ssh-agent, or configure a git credential helper or access token"
                .to_string(),
        )
    } else if stderr.contains("couldn't find remote ref") {
        Some(format!(
            "'{}' is not a branch or tag of {}",
            revision.selector(),
            locator
        ))
    } else {
        None
    };

    Error::GitFetch {
        locator: locator.to_string(),
        selector: revision.selector().to_string(),
        message: stderr.trim().to_string(),
        hint,
    }
}

/// Fetch `revision` of `locator` and check it out as a detached working tree
/// in `target_dir`, returning the commit that was checked out.
///
/// `target_dir` is created if missing and must not already hold a repository.
/// Fetches are shallow. When a shallow fetch of a commit id fails, full or
/// abbreviated, every branch and tag is fetched and the id is checked out
/// from those.
pub fn fetch(locator: &str, revision: &Revision, target_dir: &Path) -> Result<CommitId, Error> {
    let io_error = |e: std::io::Error| Error::GitFetch {
        locator: locator.to_string(),
        selector: revision.selector().to_string(),
        message: e.to_string(),
        hint: None,
    };

    fs::create_dir_all(target_dir).map_err(io_error)?;
    let remote = remote_for(locator);

    let mut init = git(target_dir);
    init.args(["init", "--quiet"]);
    let output = run(init).map_err(io_error)?;
    if !output.status.success() {
        return Err(fetch_error(
            locator,
            revision,
            &String::from_utf8_lossy(&output.stderr),
        ));
    }

    let mut shallow = git(target_dir);
    shallow
        .args(["fetch", "--quiet", "--depth=1", remote.as_str()])
        .arg(revision.selector());
    let output = run(shallow).map_err(io_error)?;

    let checkout_ref = if output.status.success() {
        "FETCH_HEAD".to_string()
    } else if matches!(revision, Revision::Resolved(_)) || revision.may_be_abbreviated_commit() {
        debug!(
            "shallow fetch of {} from {} failed, fetching all branches and tags",
            revision.selector(),
            locator
        );
        let mut full = git(target_dir);
        full.args(["fetch", "--quiet", remote.as_str()])
            .args(FULL_FETCH_REFSPECS);
        let full_output = run(full).map_err(io_error)?;
        if !full_output.status.success() {
            return Err(fetch_error(
                locator,
                revision,
                &String::from_utf8_lossy(&full_output.stderr),
            ));
        }
        revision.selector().to_string()
    } else {
        return Err(fetch_error(
            locator,
            revision,
            &String::from_utf8_lossy(&output.stderr),
        ));
    };

    let mut checkout = git(target_dir);
    checkout
        .args(["checkout", "--quiet", "--detach"])
        .arg(&checkout_ref);
    let output = run(checkout).map_err(io_error)?;
    if !output.status.success() {
        return Err(fetch_error(
            locator,
            revision,
            &String::from_utf8_lossy(&output.stderr),
        ));
    }

    head_commit(target_dir)
}

/// The commit checked out in `dir`.
pub fn head_commit(dir: &Path) -> Result<CommitId, Error> {
    let mut rev_parse = git(dir);
    rev_parse.args(["rev-parse", "HEAD"]);
    let output = run(rev_parse).map_err(|e| Error::GitCommand {
        command: "rev-parse HEAD".to_string(),
        dir: dir.to_path_buf(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    CommitId::new(&String::from_utf8_lossy(&output.stdout))
}

/// Repack and prune the object store of the repository in `dir`.
///
/// The checked-out files are left alone.
pub fn gc(dir: &Path) -> Result<(), Error> {
    let mut gc = git(dir);
    gc.args(["gc", "--quiet"]);
    let output = run(gc).map_err(|e| Error::GitCommand {
        command: "gc".to_string(),
        dir: dir.to_path_buf(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: "gc".to_string(),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
