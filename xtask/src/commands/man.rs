use std::fs;
use std::path::Path;

/// Render `upver.1` plus one `upver-<subcommand>.1` page per subcommand.
pub fn cmd_man(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let cmd = upver::command();
    write_page(out_dir, "upver", cmd.clone())?;
    for sub in cmd.get_subcommands() {
        write_page(out_dir, &format!("upver-{}", sub.get_name()), sub.clone())?;
    }

    Ok(())
}

fn write_page(out_dir: &Path, page: &str, cmd: clap::Command) -> Result<(), String> {
    let mut buffer: Vec<u8> = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buffer)
        .map_err(|e| format!("render {page}: {e}"))?;

    let path = out_dir.join(format!("{page}.1"));
    fs::write(&path, buffer).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
