//! Next-version decision from an upstream version file.
//!
//! The upstream artifact (a header, changelog, manifest...) names a final
//! release such as `3.4.5`. Downstream releases of that upstream version are
//! numbered as pre-releases: the first one gets the configured default
//! revision (`3.4.5-1`), and every later one bumps the counter (`3.4.5-2`).
//!
//! [`decide`] is pure over its inputs; [`next_version_from_file`] adds the
//! single file read.

use camino::Utf8PathBuf;
use regex::RegexBuilder;
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::version::{self, DiffClass, VersionError};

/// Name of the capture group that must hold the version in `version_pattern`.
pub const VERSION_GROUP: &str = "version";

/// Errors from the upstream version decision.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// A required configuration key is unset or empty.
    #[error("upstream-version: version {} must be specified as '{key}'", describe_key(.key))]
    MissingConfiguration {
        /// The configuration key.
        key: &'static str,
    },

    /// Reading the version file failed.
    #[error(transparent)]
    FileRead(#[from] std::io::Error),

    /// `version_pattern` is not a valid regular expression.
    #[error("upstream-version: invalid version pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// The pattern did not match anywhere in the version file.
    #[error("upstream-version: could not find version pattern in source file [{path}]: {pattern}")]
    PatternNotFound {
        /// The version file that was searched.
        path: Utf8PathBuf,
        /// The pattern source.
        pattern: String,
    },

    /// The pattern matched but yielded no `version` group.
    #[error("upstream-version: could not find named capture group 'version' in pattern: {pattern}")]
    MissingCaptureGroup {
        /// The pattern source.
        pattern: String,
    },

    /// A version string could not be normalized.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The upstream file names a pre-release.
    #[error("upstream-version: unable to use upstream version with pre-release specifier for versioning: {version}")]
    UpstreamPrerelease {
        /// The normalized upstream version.
        version: Version,
    },
}

fn describe_key(key: &str) -> &'static str {
    match key {
        "version_file" => "file for extraction",
        _ => "pattern for extraction",
    }
}

/// Result alias for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Validated settings for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamSettings {
    /// File containing the upstream version.
    pub version_file: Utf8PathBuf,
    /// Regular expression with a named group `version`, applied in
    /// multi-line mode.
    pub version_pattern: String,
    /// Pre-release number for the first release of a new upstream version.
    pub default_revision: u64,
}

/// The version found in the version file, before and after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamVersion {
    /// The `version` capture, verbatim.
    pub raw: String,
    /// The normalized final release.
    pub version: Version,
}

/// The outcome of a decision, with the intermediate values that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// The latest released version, normalized.
    pub latest: Version,
    /// The upstream version, normalized.
    pub upstream: Version,
    /// How `latest` relates to `upstream`.
    pub diff: DiffClass,
    /// The version to release next.
    pub next: Version,
}

/// Find the raw upstream version string in `contents`.
///
/// # Errors
///
/// [`UpstreamError::InvalidPattern`], [`UpstreamError::PatternNotFound`] or
/// [`UpstreamError::MissingCaptureGroup`].
pub fn extract_upstream(settings: &UpstreamSettings, contents: &str) -> UpstreamResult<String> {
    let pattern = &settings.version_pattern;
    let re = RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|source| UpstreamError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

    let caps = re
        .captures(contents)
        .ok_or_else(|| UpstreamError::PatternNotFound {
            path: settings.version_file.clone(),
            pattern: pattern.clone(),
        })?;

    caps.name(VERSION_GROUP)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::MissingCaptureGroup {
            pattern: pattern.clone(),
        })
}

/// Extract and normalize the upstream version, rejecting pre-releases.
///
/// The pattern is compiled and matched once; the raw capture is returned
/// alongside the normalized version.
pub fn upstream_version(
    settings: &UpstreamSettings,
    contents: &str,
) -> UpstreamResult<UpstreamVersion> {
    let raw = extract_upstream(settings, contents)?;
    info!(%raw, path = %settings.version_file, "extracted upstream version from source file");

    let version = version::normalize(&raw)?;
    info!(upstream = %version, "normalized upstream version");

    if !version.pre.is_empty() {
        return Err(UpstreamError::UpstreamPrerelease { version });
    }
    Ok(UpstreamVersion { raw, version })
}

/// Decide the next version from the latest release and the version file's
/// contents.
///
/// When `latest` is already a pre-release of exactly the upstream version
/// its counter is incremented. In every other case, equality included, the
/// result is `upstream-default_revision`.
#[instrument(skip(settings, contents), fields(path = %settings.version_file))]
pub fn decide(latest: &str, settings: &UpstreamSettings, contents: &str) -> UpstreamResult<Decision> {
    let latest_norm = version::normalize(latest)?;
    info!(%latest, normalized = %latest_norm, "normalized latest version");

    let upstream = upstream_version(settings, contents)?.version;

    let diff = version::classify(&latest_norm, &upstream);
    debug!(%diff, "classified version difference");

    let next = match diff {
        DiffClass::Prerelease => version::increment_prerelease(&latest_norm)?,
        DiffClass::Major | DiffClass::Minor | DiffClass::Patch | DiffClass::None => {
            version::with_revision(&upstream, settings.default_revision)
        }
    };
    info!(from = %latest_norm, to = %next, %diff, "determined increment version");

    Ok(Decision {
        latest: latest_norm,
        upstream,
        diff,
        next,
    })
}

/// Like [`decide`], returning only the formatted next version.
pub fn compute_next_version(
    latest: &str,
    settings: &UpstreamSettings,
    contents: &str,
) -> UpstreamResult<String> {
    Ok(decide(latest, settings, contents)?.next.to_string())
}

/// Read the whole version file. Invalid UTF-8 is replaced, not rejected.
///
/// # Errors
///
/// The underlying I/O error, unwrapped.
pub fn read_version_file(settings: &UpstreamSettings) -> UpstreamResult<String> {
    debug!(path = %settings.version_file, "reading version file");
    let bytes = std::fs::read(&settings.version_file)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the version file and [`decide`].
pub fn next_version_from_file(latest: &str, settings: &UpstreamSettings) -> UpstreamResult<Decision> {
    let contents = read_version_file(settings)?;
    decide(latest, settings, &contents)
}
