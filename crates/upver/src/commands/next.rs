//! Next command: a thin CLI layer over `upver_core::upstream::decide`.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use upver_core::config::Config;
use upver_core::git;
use upver_core::upstream::{self, Decision};

use super::UpstreamOverrides;

/// Arguments for the `next` subcommand.
#[derive(Args, Debug, Default)]
pub struct NextArgs {
    /// Latest released version (default: newest `v*` git tag, or 0.0.0)
    #[arg(long, value_name = "VERSION")]
    pub latest: Option<String>,

    /// Also show how the version was derived
    #[arg(long)]
    pub explain: bool,

    #[command(flatten)]
    pub upstream: UpstreamOverrides,
}

/// Execute the next command.
///
/// Plain output is the bare version string so that scripts can capture it.
#[instrument(name = "cmd_next", skip_all, fields(json_output = global_json))]
pub fn cmd_next(
    args: NextArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(latest = ?args.latest, explain = args.explain, "executing next command");

    let settings = super::resolve_settings(config, args.upstream, cwd)?;

    let latest = match args.latest {
        Some(latest) => latest,
        None => git::latest_version(cwd)
            .context("failed to determine latest version from git (pass --latest outside a repository)")?,
    };

    let decision = upstream::next_version_from_file(&latest, &settings)
        .with_context(|| format!("failed to compute next version from {}", settings.version_file))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else if args.explain {
        print_explanation(&decision);
    } else {
        println!("{}", decision.next);
    }

    Ok(())
}

fn print_explanation(decision: &Decision) {
    println!(
        "{}: {} → {}",
        "Version".bold(),
        decision.latest.to_string().dimmed(),
        decision.next.to_string().green().bold()
    );
    println!("{}: {}", "Upstream".dimmed(), decision.upstream.to_string().cyan());
    println!("{}: {}", "Difference".dimmed(), decision.diff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(dir: &camino::Utf8Path, latest: &str) -> NextArgs {
        NextArgs {
            latest: Some(latest.to_string()),
            explain: false,
            upstream: UpstreamOverrides {
                version_file: Some(dir.join("VERSION")),
                version_pattern: Some(r"^(?<version>\d+\.\d+\.\d+)$".to_string()),
                default_revision: None,
            },
        }
    }

    #[test]
    fn test_cmd_next_succeeds() {
        let tmp = TempDir::new().unwrap();
        let dir = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(dir.join("VERSION"), "2.0.0\n").unwrap();

        assert!(cmd_next(args_for(&dir, "1.0.0"), false, &Config::default(), &dir).is_ok());
        assert!(cmd_next(args_for(&dir, "2.0.0-1"), true, &Config::default(), &dir).is_ok());
    }

    #[test]
    fn test_cmd_next_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        assert!(cmd_next(args_for(&dir, "1.0.0"), false, &Config::default(), &dir).is_err());
    }
}
