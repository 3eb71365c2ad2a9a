//! End-to-end call tests.
//!
//! Most of these run without an interpreter: a missing `matlab` binary is
//! itself a realistic failure mode, and the bridge's cleanup and failure
//! contracts are exactly what must hold in that case. Tests that need a
//! real interpreter are `#[ignore]`d, in the same spirit as fixture-gated
//! tests elsewhere in the workspace.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use matcall_rs::{CallSpec, DeleteInputs, Error, MatlabCaller, NumArray};
use ndarray::array;
use tempfile::TempDir;

/// A caller pinned to a known workspace dir so cleanup can be observed.
fn pinned_caller(parent: &TempDir) -> (MatlabCaller, PathBuf) {
    let dir = parent.path().join("bridge-scratch");
    let caller = MatlabCaller::new().verbose(false).tempdir(&dir);
    (caller, dir)
}

#[test]
fn test_failed_interpreter_surfaces_as_missing_output() {
    let parent = TempDir::new().unwrap();
    let (caller, dir) = pinned_caller(&parent);

    // No `matlab` on PATH in the test environment: the shell exits
    // non-zero and never writes output_vars.mat.
    let spec = CallSpec::new("do_something")
        .input("X", NumArray::scalar(1.0))
        .outputs(["z"]);

    let err = caller.call(spec).unwrap_err();
    assert!(matches!(err, Error::MissingOutput { .. }));
    assert!(!dir.exists(), "workspace must be removed on failure");
}

#[test]
fn test_fire_and_forget_ignores_interpreter_failure() {
    let parent = TempDir::new().unwrap();
    let (caller, dir) = pinned_caller(&parent);

    // Zero outputs: no output file is expected, so even a failed spawn
    // reports success host-side.
    let spec = CallSpec::new("do_something").input("X", NumArray::scalar(1.0));

    let result = caller.call(spec).unwrap();
    assert!(result.is_empty());
    assert!(!dir.exists(), "workspace must be removed on success");
}

#[test]
fn test_serialization_failure_cleans_up() {
    let parent = TempDir::new().unwrap();
    let (caller, dir) = pinned_caller(&parent);

    // Empty variable name cannot be encoded; the error must surface
    // before any process is spawned and still clean the workspace.
    let spec = CallSpec::new("f")
        .input("", NumArray::scalar(1.0))
        .outputs(["z"]);

    let err = caller.call(spec).unwrap_err();
    assert!(matches!(err, Error::Serialize { .. }));
    assert!(!dir.exists());
}

#[test]
fn test_delete_inputs_policy_accepted() {
    let parent = TempDir::new().unwrap();
    let (caller, dir) = pinned_caller(&parent);

    let spec = CallSpec::new("f")
        .input("big", NumArray::from_vec(vec![0.0; 1024]))
        .delete_inputs(DeleteInputs::All);

    caller.call(spec).unwrap();
    assert!(!dir.exists());
}

#[test]
fn test_unsupported_version_string_rejected_early() {
    // The version selector is typed; the only way to produce one from a
    // string is FromStr, which is where "4.2" must die.
    let err = "4.2".parse::<matcall_rs::MatVersion>().unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion { .. }));
}

// ============================================================================
// Tests requiring a real interpreter
// ============================================================================

/// Write a passthrough function file and return its directory.
fn passthrough_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("do_something.m"),
        "function z = do_something(X, y)\n  z = X;\nend\n",
    )
    .unwrap();
    dir
}

#[test]
#[ignore = "Requires GNU Octave on PATH"]
fn test_octave_round_trip_flat() {
    let mfiles = passthrough_fixture();
    let caller = MatlabCaller::new()
        .use_octave(true)
        .verbose(false)
        .addpath(mfiles.path());

    let x = array![
        [1.0, 2.0, 3.0],
        [4.0, 5.0, 6.0],
        [7.0, 8.0, 9.0],
        [10.0, 11.0, 12.0],
        [13.0, 14.0, 15.0]
    ];
    let spec = CallSpec::new("do_something")
        .input("X", NumArray::from_array2(&x))
        .input("y", NumArray::from_vec(vec![0.0; 5]))
        .input_order(["X", "y"])
        .outputs(["z"]);

    let result = caller.call(spec).unwrap();
    let z = result["z"].as_array().unwrap().to_array2().unwrap();

    for (a, b) in x.iter().zip(z.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
#[ignore = "Requires MATLAB on PATH (Octave cannot save -v7.3)"]
#[cfg(feature = "hdf5")]
fn test_matlab_round_trip_hierarchical() {
    let mfiles = passthrough_fixture();
    let caller = MatlabCaller::new().verbose(false).addpath(mfiles.path());

    let x = array![[1.5, 2.5], [3.5, 4.5]];
    let spec = CallSpec::new("do_something")
        .input("X", NumArray::from_array2(&x))
        .input("y", NumArray::scalar(0.0))
        .input_order(["X", "y"])
        .outputs(["z"])
        .version(matcall_rs::MatVersion::V73);

    let result = caller.call(spec).unwrap();
    let z = result["z"].as_array().unwrap().to_array2().unwrap();

    for (a, b) in x.iter().zip(z.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}
