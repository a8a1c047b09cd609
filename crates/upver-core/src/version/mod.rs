//! Version normalization.
//!
//! Every version string that enters a decision, whether it is the latest
//! released version handed over by the host or the token extracted from an
//! upstream file, goes through [`normalize`]. Normalization is two-tiered:
//!
//! 1. [`parse_strict`] accepts well-formed `major.minor.patch[-pre]` strings.
//! 2. [`coerce`] pulls the first plausible `major[.minor[.patch]][-pre]` run
//!    out of arbitrary text, defaulting missing components to zero.
//!
//! The canonical result is a [`semver::Version`] whose build metadata is
//! always empty.

pub mod diff;

use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;
use tracing::debug;

pub use diff::{DiffClass, classify};

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Neither strict parsing nor coercion found a version.
    #[error("upstream-version: unable to parse version from {raw:?}")]
    Unparseable {
        /// The offending input, verbatim.
        raw: String,
    },

    /// The pre-release counter, or the patch of a final release, is at `u64::MAX`.
    #[error("upstream-version: {version} cannot be incremented any further")]
    PrereleaseOverflow {
        /// The version whose counter overflowed.
        version: Version,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A single pre-release identifier: alphanumeric first so that `10abc`
/// is not split into `10` and a dangling suffix.
const PRERELEASE_IDENT: &str = r"(?:[0-9]*[A-Za-z-][0-9A-Za-z-]*|0|[1-9][0-9]*)";

static COERCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?:^|[^0-9])(?<major>[0-9]{{1,16}})(?:\.(?<minor>[0-9]{{1,16}}))?(?:\.(?<patch>[0-9]{{1,16}}))?(?:-(?<pre>{id}(?:\.{id})*))?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?(?:$|[^0-9])",
        id = PRERELEASE_IDENT
    );
    Regex::new(&pattern).expect("coercion pattern is valid")
});

/// Normalize an arbitrary string into a canonical version.
///
/// Tries [`parse_strict`] first and falls back to [`coerce`].
///
/// # Errors
///
/// Returns [`VersionError::Unparseable`] when the input holds no numeric
/// run at all.
pub fn normalize(raw: &str) -> VersionResult<Version> {
    if let Some(version) = parse_strict(raw) {
        debug!(%raw, %version, "parsed strict version");
        return Ok(version);
    }

    match coerce(raw) {
        Some(version) => {
            debug!(%raw, %version, "coerced loose version");
            Ok(version)
        }
        None => Err(VersionError::Unparseable {
            raw: raw.to_string(),
        }),
    }
}

/// Parse a well-formed version string, tolerating surrounding whitespace
/// and a single `v` or `=` prefix. Build metadata is dropped.
pub fn parse_strict(raw: &str) -> Option<Version> {
    let s = raw.trim();
    let s = s.strip_prefix(['v', '=']).unwrap_or(s);
    let mut version = Version::parse(s).ok()?;
    version.build = BuildMetadata::EMPTY;
    Some(version)
}

/// Extract the first plausible version from loose text.
///
/// Only ASCII digits count; other Unicode digits are treated as text.
///
/// `"v2"` becomes `2.0.0`, `"release 2.3 final"` becomes `2.3.0`, and
/// `"1.2.3-beta.1+abc"` keeps its pre-release as `1.2.3-beta.1`.
pub fn coerce(raw: &str) -> Option<Version> {
    let caps = COERCE_RE.captures(raw)?;
    let component = |name: &str| -> Option<u64> {
        caps.name(name)
            .map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let mut version = Version::new(component("major")?, component("minor")?, component("patch")?);
    if let Some(pre) = caps.name("pre") {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    Some(version)
}

/// Bump the pre-release counter.
///
/// The last numeric identifier is incremented (`1.2.3-rc.1` → `1.2.3-rc.2`).
/// Without a numeric identifier a `0` is appended (`1.2.3-rc` →
/// `1.2.3-rc.0`). A final release moves to the first pre-release of the
/// next patch (`1.2.3` → `1.2.4-0`).
///
/// # Errors
///
/// Returns [`VersionError::PrereleaseOverflow`] if the counter (or, for a
/// final release, the patch) is already at `u64::MAX`.
pub fn increment_prerelease(version: &Version) -> VersionResult<Version> {
    let overflow = || VersionError::PrereleaseOverflow {
        version: version.clone(),
    };

    if version.pre.is_empty() {
        let patch = version.patch.checked_add(1).ok_or_else(overflow)?;
        let mut next = Version::new(version.major, version.minor, patch);
        next.pre = Prerelease::new("0").expect("0 is a valid pre-release");
        return Ok(next);
    }

    let mut idents: Vec<String> = version.pre.as_str().split('.').map(str::to_string).collect();
    let numeric = idents
        .iter()
        .rposition(|ident| !ident.is_empty() && ident.bytes().all(|b| b.is_ascii_digit()));

    match numeric {
        Some(idx) => {
            let counter: u64 = idents[idx].parse().map_err(|_| overflow())?;
            idents[idx] = counter.checked_add(1).ok_or_else(overflow)?.to_string();
        }
        None => idents.push("0".to_string()),
    }

    let mut next = Version::new(version.major, version.minor, version.patch);
    next.pre = Prerelease::new(&idents.join(".")).map_err(|_| overflow())?;
    Ok(next)
}

/// Build `major.minor.patch-revision` from the numeric part of `version`.
pub fn with_revision(version: &Version, revision: u64) -> Version {
    let mut next = Version::new(version.major, version.minor, version.patch);
    next.pre = Prerelease::new(&revision.to_string()).expect("integers are valid pre-releases");
    next
}
