//! matcall - Call MATLAB/Octave functions from the command line.
//!
//! Loads input variables from a MAT file, invokes the target function in a
//! one-shot batch interpreter session, and prints the decoded outputs.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::Args;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Run the appropriate command
    if let Err(e) = run(args) {
        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Main dispatch function.
fn run(args: Args) -> Result<()> {
    // Validate arguments
    args.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    // Dispatch to appropriate command
    if args.show_command {
        commands::show::run(&args)
    } else {
        commands::run::run(&args)
    }
}
