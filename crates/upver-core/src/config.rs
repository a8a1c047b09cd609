//! Configuration loading and discovery.
//!
//! Sources are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config in the XDG config directory
//! 3. Project config, found by walking up from the working directory
//! 4. Explicit files passed with `--config`
//!
//! # Supported formats
//!
//! TOML (`.toml`), YAML (`.yaml`, `.yml`) and JSON (`.json`).
//!
//! # Config file locations (in order of precedence, highest first):
//! - `.upver.<ext>` in current directory or any parent
//! - `upver.<ext>` in current directory or any parent
//! - `~/.config/upver/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use upver_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! let settings = config.upstream.unwrap_or_default().resolve().unwrap();
//! println!("reading {}", settings.version_file);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::upstream::{UpstreamError, UpstreamResult, UpstreamSettings};

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file exists but does not match the expected shape.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// `load_or_error` found no project or user config file.
    #[error("no upver configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Revision used when `default_revision` is unset or unusable.
pub const DEFAULT_REVISION: u64 = 1;

/// The configuration for upver.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Where the upstream version lives and how to derive revisions from it.
    pub upstream: Option<UpstreamConfig>,
}

/// The `[upstream]` section.
///
/// Every field is optional at load time so that CLI flags can fill gaps;
/// [`UpstreamConfig::resolve`] enforces the required ones.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// File containing the upstream version (e.g., a C header or changelog).
    pub version_file: Option<Utf8PathBuf>,
    /// Regular expression with a named capture group `version`.
    pub version_pattern: Option<String>,
    /// Pre-release number given to the first release of a new upstream version.
    pub default_revision: Option<RevisionValue>,
}

/// A revision as written in a config file: `7` or `"7"`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RevisionValue {
    /// An integer literal.
    Integer(i64),
    /// A string, read from its leading decimal digits.
    Text(String),
}

impl RevisionValue {
    /// Interpret the value, or `None` if it holds no usable non-negative integer.
    pub fn to_revision(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => u64::try_from(*n).ok(),
            Self::Text(s) => {
                let s = s.trim_start();
                let s = s.strip_prefix('+').unwrap_or(s);
                let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
                s[..end].parse().ok()
            }
        }
    }
}

impl std::fmt::Display for RevisionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl UpstreamConfig {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    #[must_use]
    pub fn with_overrides(self, overrides: Self) -> Self {
        Self {
            version_file: overrides.version_file.or(self.version_file),
            version_pattern: overrides.version_pattern.or(self.version_pattern),
            default_revision: overrides.default_revision.or(self.default_revision),
        }
    }

    /// Validate into the settings a decision needs.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::MissingConfiguration`] if `version_file` or
    /// `version_pattern` is unset or empty.
    pub fn resolve(&self) -> UpstreamResult<UpstreamSettings> {
        let version_file = self
            .version_file
            .clone()
            .filter(|p| !p.as_str().is_empty())
            .ok_or(UpstreamError::MissingConfiguration {
                key: "version_file",
            })?;
        let version_pattern = self
            .version_pattern
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(UpstreamError::MissingConfiguration {
                key: "version_pattern",
            })?;

        let default_revision = match &self.default_revision {
            None => DEFAULT_REVISION,
            Some(value) => value.to_revision().unwrap_or_else(|| {
                warn!(%value, fallback = DEFAULT_REVISION, "unusable default_revision");
                DEFAULT_REVISION
            }),
        };

        Ok(UpstreamSettings {
            version_file,
            version_pattern,
            default_revision,
        })
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Config file extensions, tried in this order within each directory.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Used for the XDG directory and the `.upver.<ext>` / `upver.<ext>` file names.
const APP_NAME: &str = "upver";

/// Directory entry that ends the upward project config search.
const DEFAULT_BOUNDARY: &str = ".git";

/// Builder that layers defaults, user, project and explicit config files.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader that reads the user config and stops project search at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(DEFAULT_BOUNDARY.to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Search for a project config starting at `path` and walking up.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or skip `~/.config/upver/config.<ext>`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop walking up after the directory containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Walk up to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Layer an explicit file over everything discovered. Later files win.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Config files that [`load`](Self::load) would merge, lowest precedence first.
    pub fn sources(&self) -> Vec<Utf8PathBuf> {
        let user = self
            .include_user_config
            .then(find_user_config)
            .flatten();
        let project = self
            .project_search_root
            .as_deref()
            .and_then(|root| self.find_project_config(root));

        user.into_iter()
            .chain(project)
            .chain(self.explicit_files.iter().cloned())
            .collect()
    }

    /// Merge the defaults with every file from [`sources`](Self::sources).
    ///
    /// # Errors
    ///
    /// [`ConfigError::Deserialize`] if a file cannot be read or parsed.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let sources = self.sources();
        tracing::debug!(?sources, "loading configuration");

        let config: Config = sources
            .iter()
            .fold(
                Figment::new().merge(Serialized::defaults(Config::default())),
                |figment, path| merge_file(figment, path),
            )
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;

        tracing::info!(
            log_level = config.log_level.as_str(),
            has_upstream = config.upstream.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but at least one file must exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] when there is nothing to load, otherwise as
    /// [`load`](Self::load).
    pub fn load_or_error(self) -> ConfigResult<Config> {
        if self.sources().is_empty() {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        for dir in start.ancestors() {
            let found = CONFIG_EXTENSIONS.iter().find_map(|ext| {
                [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")]
                    .into_iter()
                    .map(|name| dir.join(name))
                    .find(|path| path.is_file())
            });
            if found.is_some() {
                return found;
            }

            // The boundary directory itself is searched, its parents are not
            if self
                .boundary_marker
                .as_ref()
                .is_some_and(|marker| dir.join(marker).exists())
            {
                break;
            }
        }
        None
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let config_dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge one file, choosing the provider by extension (TOML when unknown).
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// The project config a default [`ConfigLoader`] would pick up from `start`.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new().find_project_config(start.as_ref())
}

/// `~/.config/upver/` on Linux, `~/Library/Application Support/upver/` on
/// macOS, and the platform equivalent elsewhere.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
