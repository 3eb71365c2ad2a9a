//! Command-line argument definitions using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Call a MATLAB/Octave function from the command line.
///
/// matcall loads input variables from a MAT file, runs the target function
/// in a one-shot batch interpreter session, and prints the decoded outputs.
#[derive(Parser, Debug)]
#[command(name = "matcall")]
#[command(author, version)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Name of the interpreter function to invoke
    #[arg(value_name = "FUNCTION")]
    pub function: String,

    // ========================================================================
    // Inputs
    // ========================================================================
    /// MAT file providing the input variables
    #[arg(short = 'i', long, value_name = "FILE")]
    pub inputs: Option<PathBuf>,

    /// Positional argument order (comma-separated variable names)
    ///
    /// Defaults to the variables' sorted name order.
    #[arg(long = "order", value_name = "NAMES", value_delimiter = ',')]
    pub input_order: Option<Vec<String>>,

    /// Variables passed as 'name',value keyword pairs (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub kwargs: Vec<String>,

    // ========================================================================
    // Outputs
    // ========================================================================
    /// Output variables to capture (comma-separated; empty = fire-and-forget)
    #[arg(short = 'o', long, value_name = "NAMES", value_delimiter = ',')]
    pub outputs: Vec<String>,

    /// MAT version for the output exchange file
    #[arg(long, value_name = "V", default_value = "7")]
    pub mat_version: String,

    /// Keep singleton dimensions in decoded outputs
    #[arg(long)]
    pub no_squeeze: bool,

    // ========================================================================
    // Interpreter Selection
    // ========================================================================
    /// Use GNU Octave instead of MATLAB
    #[arg(long)]
    pub octave: bool,

    /// Directory added to the interpreter search path (repeatable)
    #[arg(short = 'p', long = "addpath", value_name = "DIR")]
    pub addpath: Vec<PathBuf>,

    /// Start MATLAB with the JVM enabled
    #[arg(long)]
    pub keep_jvm: bool,

    /// Allow MATLAB to use multiple computation threads
    #[arg(long)]
    pub multi_thread: bool,

    /// Start MATLAB with display support
    #[arg(long)]
    pub display: bool,

    // ========================================================================
    // Call Decoration
    // ========================================================================
    /// Statement executed before the function call
    #[arg(long, value_name = "STMT")]
    pub pre_call: Option<String>,

    /// Statement executed after the function call
    #[arg(long, value_name = "STMT")]
    pub post_call: Option<String>,

    // ========================================================================
    // Execution Control
    // ========================================================================
    /// Use a fixed workspace directory (still removed after the call)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Print the synthesized command and exit without running anything
    #[arg(long)]
    pub show_command: bool,

    /// Show detailed progress and the interpreter command
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        // The version must be rejected before any file or process work.
        if let Err(e) = self.mat_version.parse::<matcall_rs::MatVersion>() {
            return Err(e.to_string());
        }

        if let Some(ref inputs) = self.inputs {
            if !inputs.exists() {
                return Err(format!("Input file not found: {}", inputs.display()));
            }
        }

        if self.input_order.is_some() && self.inputs.is_none() {
            return Err("--order requires --inputs".to_string());
        }

        if self.quiet && self.verbose {
            return Err("Cannot use both --quiet and --verbose".to_string());
        }

        Ok(())
    }
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # Call do_something(X, y) and capture z
    matcall do_something -i vars.mat --order X,y -o z

    # Keyword arguments: train(X, 'lambda', lambda)
    matcall train -i vars.mat --order X,lambda --kwargs lambda -o model

    # Fire-and-forget (no outputs captured)
    matcall generate_report -i vars.mat

    # Use Octave and a custom function directory
    matcall do_something -i vars.mat -o z --octave -p ./m-files

    # Hierarchical output format (requires the hdf5 build)
    matcall analyze -i vars.mat -o result --mat-version 7.3

    # Inspect the command without running an interpreter
    matcall do_something -i vars.mat --order X,y -o z --show-command
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(function: &str) -> Args {
        Args {
            function: function.to_string(),
            inputs: None,
            input_order: None,
            kwargs: Vec::new(),
            outputs: Vec::new(),
            mat_version: "7".to_string(),
            no_squeeze: false,
            octave: false,
            addpath: Vec::new(),
            keep_jvm: false,
            multi_thread: false,
            display: false,
            pre_call: None,
            post_call: None,
            workspace: None,
            show_command: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_about_line() {
        let cmd = Args::command();
        let about = cmd.get_about().map(ToString::to_string).unwrap_or_default();
        assert!(about.contains("Call a MATLAB/Octave function"), "{}", about);
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut a = args("f");
        a.mat_version = "4.2".to_string();
        let err = a.validate().unwrap_err();
        assert!(err.contains("4.2"));
    }

    #[test]
    fn test_order_requires_inputs() {
        let mut a = args("f");
        a.input_order = Some(vec!["X".to_string()]);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_quiet_verbose_conflict() {
        let mut a = args("f");
        a.quiet = true;
        a.verbose = true;
        assert!(a.validate().is_err());
    }
}
