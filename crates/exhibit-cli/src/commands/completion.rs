//! `exhibit completion <shell>`: prints a completion script.

use crate::cli::Cli;
use anyhow::Context;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;
use std::io::Write;

/// Renders the completion script for `shell` into memory.
///
/// The binary name comes from the clap definition so the script and the
/// installed executable stay in sync.
#[must_use]
pub fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    let mut script = Vec::new();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut script);
    script
}

/// Writes the completion script for `shell` to stdout.
///
/// A closed pipe (`exhibit completion bash | head`) surfaces as an error
/// rather than a panic.
pub fn execute(shell: Shell) -> Result<()> {
    let script = render(shell);
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&script)
        .and_then(|()| stdout.flush())
        .with_context(|| format!("Cannot write {shell} completions"))
}
