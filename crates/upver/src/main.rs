//! upver CLI
#![deny(unsafe_code)]

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::path::PathBuf;
use upver::{Cli, Commands, commands};
use upver_core::config::{Config, ConfigLoader};

mod observability;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let cwd = working_dir(cli.chdir.as_deref())?;
    let config = load_config(&cwd, cli.config.clone())?;

    let filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let log_dir = config.log_dir.clone().map(Utf8PathBuf::into_std_path_buf);
    let _guard = observability::init_observability(
        &observability::ObservabilityConfig::from_env_with_overrides(log_dir),
        filter,
    )
    .context("failed to initialize logging")?;

    tracing::debug!(
        command = ?cli.command,
        cwd = %cwd,
        json = cli.json,
        verbose = cli.verbose,
        "starting upver"
    );

    let result = match cli.command {
        Commands::Next(args) => commands::next::cmd_next(args, cli.json, &config, &cwd),
        Commands::Upstream(args) => commands::upstream::cmd_upstream(args, cli.json, &config, &cwd),
        Commands::Info(args) => commands::info::cmd_info(args, cli.json, &config, &cwd),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}

/// Apply `--chdir` and return the (UTF-8) directory every relative path is resolved against.
fn working_dir(chdir: Option<&std::path::Path>) -> Result<Utf8PathBuf> {
    if let Some(dir) = chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    utf8(cwd, "current directory")
}

fn load_config(cwd: &Utf8Path, explicit: Option<PathBuf>) -> Result<Config> {
    let mut loader = ConfigLoader::new().with_project_search(cwd);
    if let Some(path) = explicit {
        loader = loader.with_file(utf8(path, "config path")?);
    }
    loader.load().context("failed to load configuration")
}

fn utf8(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path)
        .map_err(|e| anyhow!("{what} is not valid UTF-8: {}", e.into_path_buf().display()))
}
