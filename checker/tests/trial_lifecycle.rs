//! Trial-level tests driving the checker against a scripted engine.
//!
//! These cover the full lifecycle of a run: input generation, engine launch,
//! comparison with the reference value, cleanup of passing trials and
//! preservation of failing ones.

use std::path::{Path, PathBuf};

use checker::core::outcome::TrialResult;
use checker::core::shape::WorkflowConfig;
use checker::core::types::ParameterWindow;
use checker::error::{CheckError, ExecutionError};
use checker::execute::Driver;
use checker::io::config::CheckConfig;
use checker::test_support::{ScriptedEngine, ScriptedLaunch, StaticLoader, sample_graph};
use checker::trial::{CheckOptions, run_check, run_trial};

fn loader() -> StaticLoader {
    StaticLoader::new(WorkflowConfig::Dsl(sample_graph()))
}

fn options(workdir: &Path, seed: u64, trials: i64, cleanup_on_success: bool) -> CheckOptions {
    CheckOptions {
        workflow_path: PathBuf::from("sum.package"),
        workdir: workdir.to_path_buf(),
        seed,
        trials,
        cleanup_on_success,
        numbers: None,
    }
}

/// `[[2,3],[1,5],[4,4]]` with window (1, 2) multiplies rows 1 and 2:
/// `1*5 + 4*4 = 21`.
#[test]
fn worked_example_passes_on_21_and_fails_on_20() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = CheckConfig::default();
    let engine = ScriptedEngine::new(vec![ScriptedLaunch::Value(21), ScriptedLaunch::Value(20)]);
    let driver = Driver::new(&engine, &config, Path::new("sum.package"), temp.path());
    let matrix = vec![vec![2, 3], vec![1, 5], vec![4, 4]];
    let window = ParameterWindow {
        index_start: 1,
        length: 2,
    };

    let pass = run_trial(&driver, 1, matrix.clone(), window, &mut std::io::sink());
    assert!(matches!(pass.result, TrialResult::Success(21)));

    let fail = run_trial(&driver, 2, matrix, window, &mut std::io::sink());
    assert!(matches!(
        fail.result,
        TrialResult::MismatchError {
            expected: 21,
            actual: 20
        }
    ));
    let err = fail.check("sum-products").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("20"), "message: {message}");
    assert!(message.contains("21"), "message: {message}");
    assert!(message.contains("sum-products"), "message: {message}");
}

#[test]
fn passing_trials_are_cleaned_up() {
    let temp = tempfile::tempdir().expect("tempdir");
    let engine = ScriptedEngine::new(vec![ScriptedLaunch::Correct, ScriptedLaunch::Correct]);

    let report = run_check(
        &loader(),
        &engine,
        &CheckConfig::default(),
        &options(temp.path(), 7, 2, true),
        &mut std::io::sink(),
    )
    .expect("run");

    assert_eq!(report.trials.len(), 2);
    for record in &report.trials {
        let artifacts = record.artifacts.as_ref().expect("artifacts");
        assert!(!artifacts.instance_dir.exists());
        assert!(!artifacts.numbers_path.exists());
        assert!(!artifacts.variables_path.exists());
    }
}

#[test]
fn passing_trials_are_kept_without_cleanup() {
    let temp = tempfile::tempdir().expect("tempdir");
    let engine = ScriptedEngine::new(vec![ScriptedLaunch::Correct]);

    let report = run_check(
        &loader(),
        &engine,
        &CheckConfig::default(),
        &options(temp.path(), 7, 1, false),
        &mut std::io::sink(),
    )
    .expect("run");

    let artifacts = report.trials[0].artifacts.as_ref().expect("artifacts");
    assert!(artifacts.output_path.is_file());
}

#[test]
fn failing_trial_keeps_artifacts_even_with_cleanup() {
    let temp = tempfile::tempdir().expect("tempdir");
    let engine = ScriptedEngine::new(vec![ScriptedLaunch::Correct, ScriptedLaunch::Value(-5)]);

    let err = run_check(
        &loader(),
        &engine,
        &CheckConfig::default(),
        &options(temp.path(), 11, 3, true),
        &mut std::io::sink(),
    )
    .unwrap_err();

    let CheckError::Mismatch {
        trial,
        actual,
        instance_dir,
        ..
    } = err
    else {
        panic!("expected mismatch, got {err:?}");
    };
    assert_eq!(trial, 2);
    assert_eq!(actual, -5);
    assert!(instance_dir.is_dir());
    assert!(temp.path().join("numbers.json").is_file());
    assert!(temp.path().join("variables.yaml").is_file());
    assert_eq!(engine.launches().len(), 2);
}

#[test]
fn missing_output_is_an_execution_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let engine = ScriptedEngine::new(vec![ScriptedLaunch::NoOutput]);

    let err = run_check(
        &loader(),
        &engine,
        &CheckConfig::default(),
        &options(temp.path(), 3, 1, true),
        &mut std::io::sink(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CheckError::Execution {
            trial: 1,
            source: ExecutionError::MissingArtifact { .. }
        }
    ));
    assert_eq!(err.exit_code(), checker::exit_codes::EXECUTION);
}

#[test]
fn same_seed_reproduces_inputs() {
    let run = |seed: u64| {
        let temp = tempfile::tempdir().expect("tempdir");
        let engine = ScriptedEngine::new(vec![ScriptedLaunch::Correct; 3]);
        let report = run_check(
            &loader(),
            &engine,
            &CheckConfig::default(),
            &options(temp.path(), seed, 3, true),
            &mut std::io::sink(),
        )
        .expect("run");
        report
            .trials
            .into_iter()
            .map(|record| (record.window, record.matrix))
            .collect::<Vec<_>>()
    };

    let first = run(2024);
    assert_eq!(first, run(2024));
    assert_ne!(first, run(2025));
}
