//! Integration tests for the matcall CLI.

use std::collections::BTreeMap;

use assert_cmd::Command;
use matcall_rs::{save_arrays, NumArray};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the matcall command.
fn matcall() -> Command {
    Command::cargo_bin("matcall").unwrap()
}

/// Write a MAT file with an X matrix and a y vector, MATLAB-style fixtures.
fn fixture_inputs(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("vars.mat");
    let mut vars = BTreeMap::new();
    vars.insert(
        "X".to_string(),
        NumArray::new(vec![5, 3], vec![0.0; 15]).unwrap(),
    );
    vars.insert("y".to_string(), NumArray::from_vec(vec![0.0; 5]));
    save_arrays(&path, &vars).unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    matcall()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Call a MATLAB/Octave function"))
        .stdout(predicate::str::contains("--show-command"))
        .stdout(predicate::str::contains("--mat-version"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version() {
    matcall()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("matcall"));
}

#[test]
fn test_missing_function() {
    matcall()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_unsupported_mat_version_fails_fast() {
    // Must fail during validation: no files written, no process spawned,
    // even in show-command mode.
    matcall()
        .arg("do_something")
        .arg("--mat-version")
        .arg("4.2")
        .arg("--show-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("4.2"))
        .stderr(predicate::str::contains("Unsupported MAT version"));
}

#[test]
fn test_nonexistent_input_file() {
    matcall()
        .arg("f")
        .arg("--inputs")
        .arg("/nonexistent/vars.mat")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_quiet_verbose_conflict() {
    matcall()
        .arg("f")
        .arg("--quiet")
        .arg("--verbose")
        .assert()
        .failure()
        .stderr(predicate::str::contains("quiet"));
}

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_show_command_matlab_shape() {
    let dir = TempDir::new().unwrap();
    let inputs = fixture_inputs(&dir);

    matcall()
        .arg("do_something")
        .arg("--inputs")
        .arg(&inputs)
        .arg("--order")
        .arg("X,y")
        .arg("--outputs")
        .arg("z")
        .arg("--show-command")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "matlab -nosplash -singleCompThread -nojvm -nodisplay -r \"",
        ))
        .stdout(predicate::str::contains("load <workspace>/input_vars.mat;"))
        .stdout(predicate::str::contains("[z] = do_something(X,y);"))
        .stdout(predicate::str::contains(
            "save -v7 <workspace>/output_vars.mat z;",
        ))
        .stdout(predicate::str::contains("exit()\""));
}

#[test]
fn test_show_command_octave_preamble() {
    matcall()
        .arg("f")
        .arg("--octave")
        .arg("--show-command")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("octave --no-gui --eval \""))
        .stdout(predicate::str::contains("f();"));
}

#[test]
fn test_show_command_kwargs() {
    let dir = TempDir::new().unwrap();
    let inputs = fixture_inputs(&dir);

    matcall()
        .arg("train")
        .arg("--inputs")
        .arg(&inputs)
        .arg("--order")
        .arg("X,y")
        .arg("--kwargs")
        .arg("y")
        .arg("--show-command")
        .assert()
        .success()
        .stdout(predicate::str::contains("train(X,'y',y);"));
}

#[test]
fn test_show_command_no_outputs_has_no_save() {
    matcall()
        .arg("f")
        .arg("--show-command")
        .assert()
        .success()
        .stdout(predicate::str::contains("save").not())
        .stdout(predicate::str::contains("exit()\""));
}

// ============================================================================
// Call Failure Tests (no interpreter installed)
// ============================================================================

#[test]
fn test_failed_call_reports_missing_output() {
    let dir = TempDir::new().unwrap();
    let inputs = fixture_inputs(&dir);

    // With no matlab on PATH the call runs, the shell fails, and the
    // bridge reports the absent output file.
    matcall()
        .arg("do_something")
        .arg("--inputs")
        .arg(&inputs)
        .arg("--outputs")
        .arg("z")
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("Output file not found"));
}
