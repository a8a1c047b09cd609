//! Latest released version lookup from git tags.
//!
//! Release hosts normally hand over the latest version themselves. When
//! none is given, the newest `v*` tag stands in for it. Shells out to `git`
//! so the user's own configuration applies.

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Version assumed when the repository has no version tags yet.
pub const FIRST_RELEASE_BASE: &str = "0.0.0";

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "tag").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// `repo` is not inside a work tree.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// First non-blank line of `git tag --sort=-version:refname` output.
fn newest_tag(listing: &str) -> Option<&str> {
    listing.lines().map(str::trim).find(|line| !line.is_empty())
}

/// The newest `v*` tag in `repo`, by version order.
///
/// # Errors
///
/// [`GitError::NotARepo`] outside a work tree; [`GitError::Exec`] when `git`
/// cannot be run.
#[instrument]
pub fn latest_version_tag(repo: &Utf8Path) -> GitResult<Option<String>> {
    let listing = git(repo, &["tag", "--list", "v*", "--sort=-version:refname"])?;
    let tag = newest_tag(&listing).map(str::to_string);
    debug!(?tag, "latest version tag");
    Ok(tag)
}

/// The latest released version according to git, or
/// [`FIRST_RELEASE_BASE`] when nothing has been tagged yet.
///
/// The tag is returned as-is (`v1.2.3`); normalization strips the prefix.
///
/// # Errors
///
/// As [`latest_version_tag`].
pub fn latest_version(repo: &Utf8Path) -> GitResult<String> {
    let tag = latest_version_tag(repo)?;
    if tag.is_none() {
        debug!(base = FIRST_RELEASE_BASE, "no version tags, treating as first release");
    }
    Ok(tag.unwrap_or_else(|| FIRST_RELEASE_BASE.to_string()))
}

/// Run a git command in `repo` and return its stdout.
fn git(repo: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git").current_dir(repo).args(args).output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.contains("not a git repository") {
        return Err(GitError::NotARepo);
    }
    Err(GitError::Command {
        command: args.first().copied().unwrap_or_default().to_string(),
        stderr,
    })
}
