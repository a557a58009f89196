use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};

use dfl_cli::cli::build_cli_command;

/// Completion script for `shell`, written to `out` or to stdout.
pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    let bin_name = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, &mut cmd, bin_name, &mut script);

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating '{}'", parent.display()))?;
            }
            fs::write(path, &script)
                .with_context(|| format!("writing completions to '{}'", path.display()))?;
            println!("Wrote {shell:?} completion to {}", path.display());
        }
        None => io::stdout()
            .write_all(&script)
            .context("writing completions to stdout")?,
    }
    Ok(())
}
