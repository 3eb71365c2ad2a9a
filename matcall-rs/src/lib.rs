//! # matcall-rs
//!
//! Call MATLAB or GNU Octave functions from Rust, exchanging numeric data
//! through temporary MAT files and one synchronous command-line invocation
//! per call. No server process, no persistent connection: each call writes
//! an input exchange file, synthesizes a one-line interpreter command,
//! runs it to completion, and decodes the output exchange file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use matcall_rs::{CallSpec, MatlabCaller, NumArray, Result};
//! use ndarray::Array2;
//!
//! fn main() -> Result<()> {
//!     let caller = MatlabCaller::new().addpath("./m-files");
//!
//!     let spec = CallSpec::new("do_something")
//!         .input("X", NumArray::from_array2(&Array2::zeros((5, 3))))
//!         .input("y", NumArray::from_vec(vec![0.0; 5]))
//!         .input_order(["X", "y"])
//!         .outputs(["z"]);
//!
//!     let result = caller.call(spec)?;
//!     let z = result["z"].as_array().unwrap();
//!     println!("z has shape {:?}", z.shape());
//!     Ok(())
//! }
//! ```
//!
//! ## How a call works
//!
//! 1. Input bindings are serialized to `<workspace>/input_vars.mat`.
//! 2. A single command line is synthesized: startup flags, `addpath`
//!    statements, `load`, the function invocation with positional and
//!    `'name',value` keyword arguments, a `save` of the requested outputs
//!    and a final `exit()`.
//! 3. The command is written to `<workspace>/commands.sh` and executed
//!    under a login shell, blocking until the interpreter exits.
//! 4. `<workspace>/output_vars.mat` is decoded back into [`MatValue`]s.
//! 5. The workspace directory is removed, on every exit path.
//!
//! ## Exchange formats
//!
//! Output versions 4, 6 and 7 are flat files decoded in one step: 6 and 7
//! with the `matfile` crate, 4 with a built-in reader for the pre-Level-5
//! layout. Version 7.3 is an HDF5 tree walked one output variable
//! at a time; it requires the `hdf5` cargo feature (and libhdf5 at build
//! time). Any other version string is rejected before anything runs.
//!
//! ## Failure signal
//!
//! The bridge does not parse the interpreter's output or exit code. If the
//! interpreter fails for any reason, the call surfaces it as
//! [`Error::MissingOutput`] when the output file never appeared, or as a
//! decode error when it is corrupt. A call with no requested outputs is
//! fire-and-forget and reports only host-side failures.

#![deny(missing_docs)]

mod caller;
mod command;
mod error;
mod exec;
mod read;
mod value;
mod version;
mod workspace;
mod write;

#[cfg(feature = "hdf5")]
mod hier;

pub use caller::{CallSpec, DeleteInputs, MatlabCaller};
pub use error::{Error, Result};
pub use read::load_flat;
pub use value::{MatValue, NumArray};
pub use version::MatVersion;
pub use write::save_arrays;

// Re-export for callers constructing arrays.
pub use ndarray;
