//! Info command: package metadata plus the configuration `next` would use.

use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use upver_core::config::{self, Config, DEFAULT_REVISION};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
}

impl PackageInfo {
    const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
        }
    }
}

/// Effective settings after layering, before CLI overrides.
#[derive(Serialize)]
struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    project_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    upstream: UpstreamInfo,
}

#[derive(Serialize)]
struct UpstreamInfo {
    version_file: Option<String>,
    version_pattern: Option<String>,
    /// The revision a new upstream version is seeded with.
    default_revision: u64,
}

impl EffectiveConfig {
    fn collect(config: &Config, cwd: &Utf8Path) -> Self {
        let upstream = config.upstream.clone().unwrap_or_default();
        Self {
            project_config: config::find_project_config(cwd).map(|p| p.to_string()),
            user_config_dir: config::user_config_dir().map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            upstream: UpstreamInfo {
                version_file: upstream.version_file.map(|p| cwd.join(p).to_string()),
                version_pattern: upstream.version_pattern.filter(|p| !p.is_empty()),
                default_revision: upstream
                    .default_revision
                    .as_ref()
                    .and_then(config::RevisionValue::to_revision)
                    .unwrap_or(DEFAULT_REVISION),
            },
        }
    }
}

#[derive(Serialize)]
struct InfoReport {
    #[serde(flatten)]
    package: PackageInfo,
    config: EffectiveConfig,
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<17} {value}", format!("{label}:").dimmed());
}

fn optional(value: Option<&String>) -> String {
    value.map_or_else(|| "unset".yellow().to_string(), |v| v.cyan().to_string())
}

/// Print package information and the effective configuration.
#[instrument(name = "cmd_info", skip_all, fields(json_output = global_json))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    let report = InfoReport {
        package: PackageInfo::current(),
        config: EffectiveConfig::collect(config, cwd),
    };
    debug!(
        project_config = ?report.config.project_config,
        "collected effective configuration"
    );

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let InfoReport { package, config } = report;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.repository.is_empty() {
        println!("{}", package.repository.cyan());
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    field("Project config", optional(config.project_config.as_ref()));
    field("User config dir", optional(config.user_config_dir.as_ref()));
    field("Log level", config.log_level);
    if let Some(dir) = &config.log_dir {
        field("Log directory", dir);
    }

    println!();
    println!("{}", "Upstream".bold().underline());
    field("Version file", optional(config.upstream.version_file.as_ref()));
    field("Version pattern", optional(config.upstream.version_pattern.as_ref()));
    field("Default revision", config.upstream.default_revision);

    Ok(())
}
