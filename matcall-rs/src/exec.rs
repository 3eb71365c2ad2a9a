//! Synchronous execution of the generated command script.

use std::path::Path;
use std::process::Command;

use crate::error::Result;

/// Run the command script and block until the interpreter exits.
///
/// On Unix the script runs under a login shell (`bash -l`) so that profile
/// configuration that puts `matlab`/`octave` on the PATH is honored. The
/// child's stdout and stderr pass through untouched, and its exit status
/// is not part of the call contract — success is judged afterwards by
/// whether the output exchange file exists and decodes. A non-zero status
/// still gets a warning on stderr as a diagnostic aid.
pub(crate) fn run_script(script: &Path, callstr: &str, verbose: bool) -> Result<()> {
    if verbose {
        println!("{}", callstr);
    }

    let status = shell_command(script).status()?;
    if !status.success() {
        eprintln!("warning: interpreter shell exited with {}", status);
    }
    Ok(())
}

#[cfg(unix)]
fn shell_command(script: &Path) -> Command {
    let mut cmd = Command::new("bash");
    cmd.arg("-l").arg(script);
    cmd
}

#[cfg(windows)]
fn shell_command(script: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(script);
    cmd
}
