//! Argument parsing for the `upver` binary.
//!
//! [`Cli`] and [`Commands`] live in the library so `xtask` can render man
//! pages and completions from [`command()`], and so command handlers in
//! [`commands`] can be unit tested without spawning the binary.

pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// When to colorize `--explain` and `info` output.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout supports it.
    #[default]
    Auto,
    /// Force color, even when piped.
    Always,
    /// Plain text only.
    Never,
}

impl ColorChoice {
    /// Install the choice as the process-wide owo-colors override.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG           Log filter (e.g., debug, upver=trace)
    UPVER_LOG_PATH     Explicit log file path
    UPVER_LOG_DIR      Log directory
";

/// Global flags and the selected subcommand.
#[derive(Parser)]
#[command(name = "upver")]
#[command(
    about = "Derive the next release version from a version string embedded in upstream sources",
    long_about = None
)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// What to compute.
    #[command(subcommand)]
    pub command: Commands,

    /// Extra config file, layered over discovered ones
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Change to DIR before discovering config or reading the version file
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize human-readable output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

/// upver subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the next release version
    Next(commands::next::NextArgs),

    /// Show the upstream version found in the version file
    Upstream(commands::upstream::UpstreamArgs),

    /// Show package information and effective configuration
    Info(commands::info::InfoArgs),
}

/// The clap command tree, used by `xtask` for man pages and completions.
pub fn command() -> clap::Command {
    Cli::command()
}
