//! Main call command: invoke the function and print its outputs.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use colored::Colorize;

use matcall_rs::{load_flat, CallSpec, MatValue, MatlabCaller, NumArray};

use crate::cli::Args;
use crate::output;

/// Run the call command.
pub fn run(args: &Args) -> Result<()> {
    let caller = build_caller(args);
    let spec = build_spec(args)?;

    output::print_verbose(
        &format!("Calling '{}' via {}", args.function, interpreter_name(args)),
        args.verbose,
    );

    let results = caller
        .call(spec)
        .with_context(|| format!("Call to '{}' failed", args.function))?;

    if args.outputs.is_empty() {
        output::print_success("call completed (no outputs requested)", args.quiet);
        return Ok(());
    }

    if !args.quiet {
        println!("{}", "Outputs".bold().underline());
        println!();
        for (name, value) in &results {
            output::print_kv(name, &summarize(value), 2);
        }
        println!();
    }
    output::print_success(
        &format!("{} output variable(s) decoded", results.len()),
        args.quiet,
    );

    Ok(())
}

/// Build a MatlabCaller from command line arguments.
pub(crate) fn build_caller(args: &Args) -> MatlabCaller {
    let mut caller = MatlabCaller::new()
        .verbose(args.verbose)
        .use_octave(args.octave)
        .single_comp_thread(!args.multi_thread)
        .no_jvm(!args.keep_jvm)
        .no_display(!args.display);

    for path in &args.addpath {
        caller = caller.addpath(path);
    }
    if let Some(ref dir) = args.workspace {
        caller = caller.tempdir(dir);
    }
    caller
}

/// Build a CallSpec from command line arguments.
pub(crate) fn build_spec(args: &Args) -> Result<CallSpec> {
    // Validated in Args::validate, so this cannot fail here.
    let version = args
        .mat_version
        .parse::<matcall_rs::MatVersion>()
        .map_err(anyhow::Error::from)?;

    let mut spec = CallSpec::new(&args.function)
        .outputs(args.outputs.iter().map(String::as_str))
        .kwargs(args.kwargs.iter().map(String::as_str))
        .squeeze(!args.no_squeeze)
        .version(version);

    if let Some(ref order) = args.input_order {
        spec = spec.input_order(order.iter().map(String::as_str));
    }
    if let Some(ref pre) = args.pre_call {
        spec = spec.pre_call(pre);
    }
    if let Some(ref post) = args.post_call {
        spec = spec.post_call(post);
    }

    if let Some(ref path) = args.inputs {
        spec = spec.inputs(load_inputs(args, path)?);
    }

    Ok(spec)
}

/// Load input bindings from a flat MAT file.
fn load_inputs(args: &Args, path: &std::path::Path) -> Result<BTreeMap<String, NumArray>> {
    let values = load_flat(path, false)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let mut inputs = BTreeMap::new();
    for (name, value) in values {
        match value {
            MatValue::Array(array) => {
                inputs.insert(name, array);
            }
            MatValue::Struct(_) => {
                output::print_warning(&format!(
                    "skipping input '{}': struct inputs cannot be re-serialized",
                    name
                ));
            }
        }
    }

    output::print_verbose(
        &format!("Loaded {} input variable(s) from {}", inputs.len(), path.display()),
        args.verbose,
    );
    Ok(inputs)
}

/// One-line summary of a decoded output value.
fn summarize(value: &MatValue) -> String {
    match value {
        MatValue::Array(a) => {
            if let Some(x) = a.as_scalar() {
                format!("{}", x)
            } else if a.is_1d() && a.len() <= 8 {
                format!("{:?}", a.real_data())
            } else {
                value.describe()
            }
        }
        MatValue::Struct(_) => value.describe(),
    }
}

fn interpreter_name(args: &Args) -> &'static str {
    if args.octave {
        "Octave"
    } else {
        "MATLAB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("matcall").chain(argv.iter().copied()))
    }

    #[test]
    fn test_caller_flag_mapping() {
        let args = parse(&["f", "--octave", "--multi-thread", "--keep-jvm"]);
        let caller = build_caller(&args);

        assert!(caller.use_octave);
        assert!(!caller.single_comp_thread);
        assert!(!caller.no_jvm);
        assert!(caller.no_display);
    }

    #[test]
    fn test_spec_mapping() {
        let args = parse(&[
            "do_something",
            "-o",
            "z,w",
            "--kwargs",
            "y",
            "--mat-version",
            "6",
            "--no-squeeze",
        ]);
        let spec = build_spec(&args).unwrap();

        assert_eq!(spec.function, "do_something");
        assert_eq!(spec.output_names, vec!["z", "w"]);
        assert_eq!(spec.kwarg_names, vec!["y"]);
        assert!(!spec.squeeze);
        assert_eq!(spec.version, matcall_rs::MatVersion::V6);
    }

    #[test]
    fn test_summarize_scalar() {
        let v = MatValue::Array(NumArray::scalar(2.5));
        assert_eq!(summarize(&v), "2.5");
    }
}
