use std::fs;
use std::path::Path;

use clap::Args;
use clap_complete::{Shell, generate_to};

const DEFAULT_SHELLS: [Shell; 4] = [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell];

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Only this shell (default: bash, zsh, fish, powershell)
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,
}

pub fn cmd_completions(args: &CompletionsArgs, out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let shells = args.shell.map_or_else(|| DEFAULT_SHELLS.to_vec(), |shell| vec![shell]);
    let mut cmd = upver::command();
    for shell in shells {
        let path = generate_to(shell, &mut cmd, "upver", out_dir)
            .map_err(|e| format!("generate {shell} completions: {e}"))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
