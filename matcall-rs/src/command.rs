//! Interpreter command synthesis.
//!
//! Builds the single `matlab -r "..."` / `octave --eval "..."` line that
//! loads the input exchange file, invokes the target function, saves the
//! requested outputs and exits, plus the small shell script wrapping it.

use std::env;
use std::fs;
use std::path::Path;

use crate::caller::{CallSpec, MatlabCaller};
use crate::error::Result;

/// Assemble the full interpreter command for one call.
///
/// The command is deterministic given the caller configuration, the call
/// spec and the workspace directory; no file system access happens here.
pub(crate) fn build_call_string(caller: &MatlabCaller, spec: &CallSpec, dir: &Path) -> String {
    let mut callstr = startup_preamble(caller);

    for path in &caller.addpath {
        callstr.push_str(&format!("addpath('{}'); ", path.display()));
    }

    let mut input_list = String::new();
    if !spec.inputs.is_empty() {
        callstr.push_str(&format!("load {};", dir.join("input_vars.mat").display()));
        input_list = argument_list(spec);
    }

    if let Some(pre) = &spec.pre_call {
        callstr.push_str(&format!(" {};", pre));
    }

    if !spec.output_names.is_empty() {
        callstr.push_str(&format!(" [{}] = ", spec.output_names.join(", ")));
    }

    callstr.push_str(&format!("{}({});", spec.function, input_list));

    if let Some(post) = &spec.post_call {
        callstr.push_str(&format!(" {};", post));
    }

    if !spec.output_names.is_empty() {
        callstr.push_str(&format!(
            " save {} {} {};",
            spec.version.save_flag(),
            dir.join("output_vars.mat").display(),
            spec.output_names.join(" ")
        ));
    }

    // The interpreter must always be told to quit, or batch mode hangs
    // waiting for interactive input.
    callstr.push_str(" exit()\"");
    callstr
}

/// Startup flags for the selected interpreter, ending in the opening quote
/// of the inline-evaluation argument.
fn startup_preamble(caller: &MatlabCaller) -> String {
    if caller.use_octave {
        return "octave --no-gui --eval \"".to_string();
    }

    let mut preamble = String::from("matlab -nosplash");
    if caller.single_comp_thread {
        preamble.push_str(" -singleCompThread");
    }
    if caller.no_jvm {
        preamble.push_str(" -nojvm");
    }
    if caller.no_display {
        preamble.push_str(" -nodisplay");
    }
    preamble.push_str(" -r \"");
    preamble
}

/// Build the comma-joined function argument list.
///
/// Names flagged as keyword arguments render as `'name',name` pairs, so the
/// callee receives a conventional name/value pair; everything else renders
/// bare. The order is the configured input order, falling back to the
/// bindings' natural (sorted) key order.
fn argument_list(spec: &CallSpec) -> String {
    let order: Vec<&str> = match &spec.input_order {
        Some(names) => names.iter().map(|s| s.as_str()).collect(),
        None => spec.inputs.keys().map(|s| s.as_str()).collect(),
    };

    let args: Vec<String> = order
        .iter()
        .map(|name| {
            if spec.kwarg_names.iter().any(|k| k == name) {
                format!("'{}',{}", name, name)
            } else {
                (*name).to_string()
            }
        })
        .collect();

    args.join(",")
}

/// Write the wrapper script executed by the login shell.
///
/// The DISPLAY export is only emitted when the variable is absent from the
/// parent environment, so a headless interpreter start still works without
/// clobbering a real session's display.
pub(crate) fn write_script(path: &Path, callstr: &str) -> Result<()> {
    let mut script = String::from("#!/bin/bash\n");
    if env::var_os("DISPLAY").is_none() {
        script.push_str("export DISPLAY=:0\n");
    }
    script.push_str(callstr);
    script.push('\n');

    fs::write(path, script)?;
    Ok(())
}
