//! Core library for upver.
//!
//! upver derives the next release version of a downstream package from a
//! version string embedded in its upstream sources.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management, with [`ConfigError`]
//! - [`git`] - Latest version lookup from git tags
//! - [`upstream`] - Upstream extraction and the next-version decision
//! - [`version`] - Version normalization and difference classification
//!
//! # Quick Start
//!
//! ```
//! use upver_core::upstream::{UpstreamSettings, compute_next_version};
//!
//! let settings = UpstreamSettings {
//!     version_file: "version.h".into(),
//!     version_pattern: r#"VERSION\s*=\s*"(?<version>[^"]+)""#.into(),
//!     default_revision: 7,
//! };
//! let next = compute_next_version("3.3.0", &settings, r#"VERSION = "3.4.5""#).unwrap();
//! assert_eq!(next, "3.4.5-7");
//! ```
#![deny(unsafe_code)]

pub mod config;

pub mod git;

pub mod upstream;

pub mod version;

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult, LogLevel, UpstreamConfig};

pub use upstream::{Decision, UpstreamError, UpstreamResult, UpstreamSettings, UpstreamVersion};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
