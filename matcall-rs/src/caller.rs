//! The call bridge itself: per-caller configuration, per-call specs and
//! the synchronous call sequence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::command;
use crate::error::{Error, Result};
use crate::exec;
use crate::read;
use crate::value::{MatValue, NumArray};
use crate::version::MatVersion;
use crate::workspace::Workspace;
use crate::write;

#[cfg(feature = "hdf5")]
use crate::hier;

/// Per-caller configuration for invoking MATLAB or Octave.
///
/// A caller is cheap to construct and reusable across calls. Each call
/// gets its own temporary workspace unless [`tempdir`](Self::tempdir)
/// pins one (in which case concurrent calls through the same caller would
/// race and are the caller's responsibility to avoid).
///
/// # Example
///
/// ```no_run
/// use matcall_rs::{CallSpec, MatlabCaller, NumArray};
/// use ndarray::Array2;
///
/// let caller = MatlabCaller::new().addpath("./m-files").verbose(false);
///
/// let spec = CallSpec::new("do_something")
///     .input("X", NumArray::from_array2(&Array2::zeros((5, 3))))
///     .input("y", NumArray::from_vec(vec![0.0; 5]))
///     .input_order(["X", "y"])
///     .outputs(["z"]);
///
/// let result = caller.call(spec)?;
/// println!("z: {}", result["z"].describe());
/// # Ok::<(), matcall_rs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MatlabCaller {
    /// Directories added to the interpreter's search path, in order.
    pub addpath: Vec<PathBuf>,

    /// Fixed workspace directory. `None` generates a fresh one per call.
    pub tempdir: Option<PathBuf>,

    /// Print the synthesized command before executing it.
    pub verbose: bool,

    /// Pass `-singleCompThread` (MATLAB only).
    pub single_comp_thread: bool,

    /// Target Octave (`octave --no-gui --eval`) instead of MATLAB.
    pub use_octave: bool,

    /// Pass `-nojvm` (MATLAB only).
    pub no_jvm: bool,

    /// Pass `-nodisplay` (MATLAB only).
    pub no_display: bool,
}

impl Default for MatlabCaller {
    fn default() -> Self {
        MatlabCaller {
            addpath: Vec::new(),
            tempdir: None,
            verbose: true,
            single_comp_thread: true,
            use_octave: false,
            no_jvm: true,
            no_display: true,
        }
    }
}

impl MatlabCaller {
    /// Create a caller with default settings (MATLAB, all headless flags
    /// on, verbose).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to the interpreter's search path.
    pub fn addpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.addpath.push(path.into());
        self
    }

    /// Pin the workspace directory instead of generating one per call.
    ///
    /// The directory is still removed entirely when each call returns.
    pub fn tempdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.tempdir = Some(path.into());
        self
    }

    /// Set whether the synthesized command is printed before execution.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set whether MATLAB runs with a single computation thread.
    pub fn single_comp_thread(mut self, on: bool) -> Self {
        self.single_comp_thread = on;
        self
    }

    /// Target Octave instead of MATLAB.
    pub fn use_octave(mut self, on: bool) -> Self {
        self.use_octave = on;
        self
    }

    /// Set whether MATLAB starts without the JVM.
    pub fn no_jvm(mut self, on: bool) -> Self {
        self.no_jvm = on;
        self
    }

    /// Set whether MATLAB starts without a display.
    pub fn no_display(mut self, on: bool) -> Self {
        self.no_display = on;
        self
    }

    /// Synthesize the interpreter command for a spec without running it.
    ///
    /// `workspace` stands in for the temporary directory the real call
    /// would use. This is the dry-run surface used by the CLI's
    /// `--show-command` and by tests; no files are written.
    pub fn render(&self, spec: &CallSpec, workspace: &Path) -> String {
        command::build_call_string(self, spec, workspace)
    }

    /// Invoke the target function and return its decoded outputs.
    ///
    /// The sequence is strictly synchronous: serialize inputs, write the
    /// command script, spawn the interpreter and block until it exits,
    /// then decode the output file. The temporary workspace is removed on
    /// every exit path, including serialization and decode failures.
    ///
    /// With no output names in the spec, the call is fire-and-forget: no
    /// output file is requested, read, or reported, and the result map is
    /// empty.
    ///
    /// # Errors
    ///
    /// - [`Error::Hdf5Disabled`] for a v7.3 spec without the `hdf5`
    ///   feature, before anything is written or spawned
    /// - [`Error::Serialize`] if an input binding cannot be encoded
    /// - [`Error::MissingOutput`] if the interpreter did not produce the
    ///   output file (the only failure signal a crashed call leaves)
    /// - [`Error::InvalidFormat`] if the output file is corrupt/truncated
    pub fn call(&self, mut spec: CallSpec) -> Result<BTreeMap<String, MatValue>> {
        #[cfg(not(feature = "hdf5"))]
        if spec.version.is_hierarchical() && !spec.output_names.is_empty() {
            return Err(Error::Hdf5Disabled);
        }

        let workspace = Workspace::acquire(self.tempdir.as_deref())?;

        if !spec.inputs.is_empty() {
            write::save_arrays(&workspace.input_file(), &spec.inputs)?;
        }

        let callstr = command::build_call_string(self, &spec, workspace.path());
        command::write_script(&workspace.script_file(), &callstr)?;

        // Serialized bindings are no longer needed host-side; honoring the
        // release policy here bounds peak memory while the child runs.
        spec.release_inputs();

        exec::run_script(&workspace.script_file(), &callstr, self.verbose)?;

        if spec.output_names.is_empty() {
            return Ok(BTreeMap::new());
        }

        let outfile = workspace.output_file();
        if !outfile.exists() {
            return Err(Error::MissingOutput { path: outfile });
        }

        if spec.version.is_hierarchical() {
            #[cfg(feature = "hdf5")]
            {
                let mut outputs = BTreeMap::new();
                for name in &spec.output_names {
                    let value = hier::load_variable(&outfile, name, spec.squeeze)?;
                    outputs.insert(name.clone(), value);
                }
                return Ok(outputs);
            }
            #[cfg(not(feature = "hdf5"))]
            return Err(Error::Hdf5Disabled);
        }

        read::load_flat(&outfile, spec.squeeze)
    }
}

/// Policy for releasing input bindings after serialization.
///
/// Releasing early is a memory-pressure optimization for large arrays: the
/// host-side copies are dropped once the input exchange file is on disk,
/// before the interpreter (which now holds its own copy) is spawned. It
/// has no effect on the call's result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteInputs {
    /// Keep all bindings for the duration of the call.
    #[default]
    Keep,

    /// Drop every input binding after serialization.
    All,

    /// Drop only the named bindings after serialization.
    Named(Vec<String>),
}

/// Description of one interpreter invocation.
///
/// Built with chained setters; see [`MatlabCaller`] for a full example.
///
/// Flat output versions (4, 6 and 7) decode numeric arrays only: a
/// function returning a MATLAB struct under one of those versions will not
/// appear in the result map at all. Struct-valued outputs need
/// [`MatVersion::V73`] (and the `hdf5` feature), which decodes them as
/// [`MatValue::Struct`] trees.
#[derive(Debug, Clone)]
pub struct CallSpec {
    /// Name of the interpreter function to invoke.
    pub function: String,

    /// Named input bindings destined for the interpreter workspace.
    pub inputs: BTreeMap<String, NumArray>,

    /// Positional argument order. `None` uses the bindings' sorted keys.
    pub input_order: Option<Vec<String>>,

    /// Input names passed as `'name',value` keyword pairs.
    pub kwarg_names: Vec<String>,

    /// Output variables to capture and decode. Empty means fire-and-forget.
    pub output_names: Vec<String>,

    /// Input release policy applied after serialization.
    pub delete_inputs: DeleteInputs,

    /// Literal statement executed before the function call.
    pub pre_call: Option<String>,

    /// Literal statement executed after the function call.
    pub post_call: Option<String>,

    /// Remove singleton dimensions from decoded outputs.
    pub squeeze: bool,

    /// Exchange format for the output file.
    pub version: MatVersion,
}

impl CallSpec {
    /// Create a spec for the given target function, with no inputs or
    /// outputs, squeezing enabled and MAT version 7.
    pub fn new(function: impl Into<String>) -> Self {
        CallSpec {
            function: function.into(),
            inputs: BTreeMap::new(),
            input_order: None,
            kwarg_names: Vec::new(),
            output_names: Vec::new(),
            delete_inputs: DeleteInputs::Keep,
            pre_call: None,
            post_call: None,
            squeeze: true,
            version: MatVersion::default(),
        }
    }

    /// Add one named input binding.
    pub fn input(mut self, name: impl Into<String>, array: NumArray) -> Self {
        self.inputs.insert(name.into(), array);
        self
    }

    /// Replace the input bindings wholesale.
    pub fn inputs(mut self, inputs: BTreeMap<String, NumArray>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the positional argument order.
    pub fn input_order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Mark inputs to be passed as keyword pairs.
    pub fn kwargs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kwarg_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the output variables to capture.
    pub fn outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the input release policy.
    pub fn delete_inputs(mut self, policy: DeleteInputs) -> Self {
        self.delete_inputs = policy;
        self
    }

    /// Set a statement to run before the function call.
    pub fn pre_call(mut self, fragment: impl Into<String>) -> Self {
        self.pre_call = Some(fragment.into());
        self
    }

    /// Set a statement to run after the function call.
    pub fn post_call(mut self, fragment: impl Into<String>) -> Self {
        self.post_call = Some(fragment.into());
        self
    }

    /// Set whether singleton dimensions are squeezed out of outputs.
    pub fn squeeze(mut self, on: bool) -> Self {
        self.squeeze = on;
        self
    }

    /// Set the output exchange format version.
    pub fn version(mut self, version: MatVersion) -> Self {
        self.version = version;
        self
    }

    /// Apply the release policy to the serialized bindings.
    fn release_inputs(&mut self) {
        match std::mem::take(&mut self.delete_inputs) {
            DeleteInputs::Keep => {}
            DeleteInputs::All => self.inputs.clear(),
            DeleteInputs::Named(names) => {
                for name in names {
                    self.inputs.remove(&name);
                }
            }
        }
    }
}
