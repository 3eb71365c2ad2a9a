//! Dry-run command: print the synthesized interpreter command.

use std::path::Path;

use anyhow::Result;

use crate::cli::Args;
use crate::commands::run::{build_caller, build_spec};

/// Run the show-command mode.
///
/// Synthesizes the exact command the call would execute, with the
/// placeholder `<workspace>` standing in for the per-call temporary
/// directory, and prints it to stdout. Nothing is spawned and no
/// temporary files are created.
pub fn run(args: &Args) -> Result<()> {
    let caller = build_caller(args);
    let spec = build_spec(args)?;

    let command = caller.render(&spec, Path::new("<workspace>"));
    println!("{}", command);

    Ok(())
}
