//! `cargo xtask` for upver: render shell completions and man pages for
//! packaging. Output lands under `dist/share/` in the workspace root unless
//! `--dist` says otherwise.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xtask", about = "Packaging assets for upver")]
struct Xtask {
    /// Distribution root, relative to the workspace root
    #[arg(long, global = true, default_value = "dist")]
    dist: PathBuf,

    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Write upver completions to <dist>/share/completions
    Completions(commands::completions::CompletionsArgs),

    /// Write upver man pages to <dist>/share/man/man1
    Man,
}

impl Xtask {
    fn share_dir(&self, sub: &str) -> PathBuf {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest_dir.parent().unwrap_or(&manifest_dir);
        root.join(&self.dist).join("share").join(sub)
    }
}

fn main() -> Result<(), String> {
    let xtask = Xtask::parse();
    match &xtask.task {
        Task::Completions(args) => {
            commands::completions::cmd_completions(args, &xtask.share_dir("completions"))
        }
        Task::Man => commands::man::cmd_man(&xtask.share_dir("man/man1")),
    }
}
