//! Upstream command: print the normalized upstream version.

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};

use upver_core::config::Config;
use upver_core::upstream::{self, UpstreamVersion};

use super::UpstreamOverrides;

/// Arguments for the `upstream` subcommand.
#[derive(Args, Debug, Default)]
pub struct UpstreamArgs {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,
}

#[derive(Serialize)]
struct UpstreamReport {
    version_file: String,
    #[serde(flatten)]
    upstream: UpstreamVersion,
}

/// Print the upstream version found in the version file.
#[instrument(name = "cmd_upstream", skip_all, fields(json_output = global_json))]
pub fn cmd_upstream(
    args: UpstreamArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!("executing upstream command");

    let settings = super::resolve_settings(config, args.upstream, cwd)?;
    let contents = upstream::read_version_file(&settings)
        .with_context(|| format!("failed to read {}", settings.version_file))?;

    let report = UpstreamReport {
        version_file: settings.version_file.to_string(),
        upstream: upstream::upstream_version(&settings, &contents)?,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.upstream.version);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_with_pattern(pattern: &str) -> UpstreamArgs {
        UpstreamArgs {
            upstream: UpstreamOverrides {
                version_file: Some("version.h".into()),
                version_pattern: Some(pattern.to_string()),
                default_revision: None,
            },
        }
    }

    #[test]
    fn test_cmd_upstream_reads_relative_file() {
        let tmp = TempDir::new().unwrap();
        let dir = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(dir.join("version.h"), "#define V \"1.4\"\n").unwrap();

        let args = args_with_pattern(r#"#define V "(?<version>[^"]+)""#);
        assert!(cmd_upstream(args, true, &Config::default(), &dir).is_ok());
    }

    #[test]
    fn test_cmd_upstream_rejects_prerelease() {
        let tmp = TempDir::new().unwrap();
        let dir = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(dir.join("version.h"), "#define V \"1.4.0-rc.1\"\n").unwrap();

        let args = args_with_pattern(r#"#define V "(?<version>[^"]+)""#);
        assert!(cmd_upstream(args, false, &Config::default(), &dir).is_err());
    }
}
