//! CLI tests for `check-homework`.
//!
//! Spawns the binary against stub launcher scripts and verifies the exit
//! code for each way a run can end.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use checker::exit_codes;
use checker::test_support::SAMPLE_DSL;

/// Writes the length of the window as the answer; correct for all-ones rows.
const WINDOW_LENGTH_LAUNCHER: &str = r#"#!/bin/sh
variables="$4"
name="$7"
length=$(sed -n 's/^  length: *//p' "$variables")
out="$name.instance/stages/stage0/sum-products"
mkdir -p "$out"
printf '%s\n' "$length" > "$out/sum_of_products.json"
"#;

fn write_workflow(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("sum.yaml");
    fs::write(&path, contents).expect("write workflow");
    path
}

fn write_launcher(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("fake-elaunch.sh");
    fs::write(&path, script).expect("write launcher");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn check_homework(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_check-homework"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("check-homework")
}

fn run_with_launcher(dir: &Path, launcher: &Path, extra: &[&str]) -> Output {
    let workflow = write_workflow(dir, SAMPLE_DSL);
    let mut args = vec![
        "--path",
        workflow.to_str().expect("utf8"),
        "--launcher",
        launcher.to_str().expect("utf8"),
        "--seed",
        "5",
    ];
    args.extend_from_slice(extra);
    check_homework(dir, &args)
}

#[test]
fn passing_workflow_exits_ok_and_cleans_up() {
    let temp = tempfile::tempdir().expect("tempdir");
    let launcher = write_launcher(temp.path(), WINDOW_LENGTH_LAUNCHER);
    let numbers = temp.path().join("ones.json");
    fs::write(&numbers, serde_json::to_string(&vec![vec![1, 1]; 10]).expect("json"))
        .expect("write numbers");

    let output = run_with_launcher(
        temp.path(),
        &launcher,
        &["--numbers", numbers.to_str().expect("utf8")],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "stdout: {stdout}");
    assert!(stdout.contains("Seed for the runs 5"));
    assert!(stdout.contains("Congratulations! Your experiment works as expected"));
    assert!(!temp.path().join("numbers.json").exists());
    let leftovers = fs::read_dir(temp.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".instance"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn engine_failure_exits_with_execution_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let launcher = write_launcher(temp.path(), "#!/bin/sh\necho boom >&2\nexit 3\n");

    let output = run_with_launcher(temp.path(), &launcher, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::EXECUTION));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit code 3"), "stderr: {stderr}");
}

#[test]
fn missing_output_exits_with_execution_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let launcher = write_launcher(temp.path(), "#!/bin/sh\nexit 0\n");

    let output = run_with_launcher(temp.path(), &launcher, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::EXECUTION));
    assert!(temp.path().join("numbers.json").is_file());
}

#[test]
fn wrong_workflow_name_exits_with_shape_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let launcher = write_launcher(temp.path(), "#!/bin/sh\nexit 0\n");
    let workflow = write_workflow(
        temp.path(),
        &SAMPLE_DSL.replace("calculate-sum-of-products", "calculate-sum"),
    );

    let output = check_homework(
        temp.path(),
        &[
            "--path",
            workflow.to_str().expect("utf8"),
            "--launcher",
            launcher.to_str().expect("utf8"),
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::SHAPE));
    assert!(!temp.path().join("numbers.json").exists());
}

#[test]
fn negative_trials_exits_with_config_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let launcher = write_launcher(temp.path(), "#!/bin/sh\nexit 0\n");

    let output = run_with_launcher(temp.path(), &launcher, &["--number-tests", "-1"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("non-negative"), "stderr: {stderr}");
}
