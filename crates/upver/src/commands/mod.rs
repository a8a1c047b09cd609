//! Command implementations

pub mod info;

pub mod next;

pub mod upstream;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;

use upver_core::config::{Config, UpstreamConfig};
use upver_core::upstream::UpstreamSettings;

/// Flags that override the `[upstream]` config section.
///
/// Shared by every command that reads the version file.
#[derive(Args, Debug, Default, Clone)]
pub struct UpstreamOverrides {
    /// File containing the upstream version
    #[arg(long, value_name = "PATH")]
    pub version_file: Option<Utf8PathBuf>,

    /// Regular expression with a named capture group `version`
    #[arg(long, value_name = "REGEX")]
    pub version_pattern: Option<String>,

    /// Pre-release number for the first release of a new upstream version
    #[arg(long, value_name = "N")]
    pub default_revision: Option<u64>,
}

impl UpstreamOverrides {
    /// The path and pattern overrides as a config layer. `default_revision`
    /// is already typed and is applied after resolution instead.
    fn into_config(self) -> UpstreamConfig {
        UpstreamConfig {
            version_file: self.version_file,
            version_pattern: self.version_pattern,
            default_revision: None,
        }
    }
}

/// Merge CLI overrides into the loaded config and validate the result.
///
/// A relative `version_file` is resolved against `cwd`.
pub fn resolve_settings(
    config: &Config,
    overrides: UpstreamOverrides,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<UpstreamSettings> {
    let revision = overrides.default_revision;
    let mut upstream = config
        .upstream
        .clone()
        .unwrap_or_default()
        .with_overrides(overrides.into_config());
    if revision.is_some() {
        upstream.default_revision = None;
    }

    let mut settings = upstream
        .resolve()
        .context("invalid upstream configuration")?;
    if let Some(revision) = revision {
        settings.default_revision = revision;
    }

    if settings.version_file.is_relative() {
        settings.version_file = cwd.join(&settings.version_file);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_fill_missing_config() {
        let overrides = UpstreamOverrides {
            version_file: Some("VERSION".into()),
            version_pattern: Some("(?<version>.+)".into()),
            default_revision: Some(4),
        };
        let settings =
            resolve_settings(&Config::default(), overrides, camino::Utf8Path::new("/work")).unwrap();
        assert_eq!(settings.version_file.as_str(), "/work/VERSION");
        assert_eq!(settings.default_revision, 4);
    }

    #[test]
    fn revision_flag_replaces_config_value() {
        let config = Config {
            upstream: Some(UpstreamConfig {
                version_file: Some("VERSION".into()),
                version_pattern: Some("(?<version>.+)".into()),
                default_revision: Some(upver_core::config::RevisionValue::Text("junk".into())),
            }),
            ..Config::default()
        };
        let overrides = UpstreamOverrides {
            default_revision: Some(u64::MAX),
            ..UpstreamOverrides::default()
        };
        let settings =
            resolve_settings(&config, overrides, camino::Utf8Path::new("/work")).unwrap();
        assert_eq!(settings.default_revision, u64::MAX);
        assert_eq!(settings.version_pattern, "(?<version>.+)");
    }

    #[test]
    fn missing_pattern_fails() {
        let overrides = UpstreamOverrides {
            version_file: Some("VERSION".into()),
            ..UpstreamOverrides::default()
        };
        let err = resolve_settings(&Config::default(), overrides, camino::Utf8Path::new("/work"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("version_pattern"));
    }

    #[test]
    fn absolute_version_file_is_kept() {
        let overrides = UpstreamOverrides {
            version_file: Some("/src/VERSION".into()),
            version_pattern: Some("(?<version>.+)".into()),
            default_revision: None,
        };
        let settings =
            resolve_settings(&Config::default(), overrides, camino::Utf8Path::new("/work")).unwrap();
        assert_eq!(settings.version_file.as_str(), "/src/VERSION");
        assert_eq!(settings.default_revision, 1);
    }
}
