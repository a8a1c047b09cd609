//! Difference classification between two normalized versions.

use semver::Version;
use serde::{Deserialize, Serialize};

/// How far apart two versions are, at the coarsest differing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffClass {
    /// Major components differ.
    Major,
    /// Minor components differ.
    Minor,
    /// Patch components differ, or pre-releases differ in any way not
    /// covered by [`DiffClass::Prerelease`].
    Patch,
    /// Same `major.minor.patch`; only the latest version is a pre-release.
    Prerelease,
    /// Fully equal, pre-release included.
    None,
}

impl std::fmt::Display for DiffClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Classify the relationship between the latest release and the upstream
/// version.
///
/// Build metadata is ignored.
pub fn classify(latest: &Version, upstream: &Version) -> DiffClass {
    if latest.major != upstream.major {
        return DiffClass::Major;
    }
    if latest.minor != upstream.minor {
        return DiffClass::Minor;
    }
    if latest.patch != upstream.patch {
        return DiffClass::Patch;
    }

    match (latest.pre.is_empty(), upstream.pre.is_empty()) {
        _ if latest.pre == upstream.pre => DiffClass::None,
        (false, true) => DiffClass::Prerelease,
        _ => DiffClass::Patch,
    }
}
