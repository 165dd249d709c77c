//! Trial runner: the `check-homework` state machine.
//!
//! ```text
//! Idle -> ShapeChecked -> {Running trial i}* -> Done
//!   \__________\_______________\______________-> Aborted
//! ```
//!
//! The shape check runs once before any trial. Trials run strictly one after
//! another and the run stops at the first failing trial, whose artifacts are
//! always left on disk. A passing trial's artifacts are removed when cleanup
//! is enabled.

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use crate::core::inputs::InputGenerator;
use crate::core::outcome::{TrialResult, classify_trial};
use crate::core::reference::calculate;
use crate::core::types::{NumericMatrix, ParameterWindow};
use crate::error::CheckError;
use crate::execute::Driver;
use crate::io::artifacts::ExecutionArtifacts;
use crate::io::config::CheckConfig;
use crate::io::engine::Engine;
use crate::io::loader::WorkflowLoader;
use crate::validate::validate_workflow;

/// Run-level knobs, resolved by the caller.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Workflow package or definition under test.
    pub workflow_path: PathBuf,
    /// Directory the input files and instance directories are written to.
    pub workdir: PathBuf,
    /// Seed for the single random stream shared by all trials.
    pub seed: u64,
    /// Number of trials; negative values are rejected before any work.
    pub trials: i64,
    /// Remove a passing trial's instance directory and input files.
    pub cleanup_on_success: bool,
    /// Use this matrix in every trial instead of generating one.
    pub numbers: Option<NumericMatrix>,
}

/// Inputs and outcome of one trial.
#[derive(Debug)]
pub struct TrialRecord {
    /// 1-based trial number.
    pub trial: usize,
    pub window: ParameterWindow,
    pub matrix: NumericMatrix,
    /// Present whenever the engine produced its output file.
    pub artifacts: Option<ExecutionArtifacts>,
    pub result: TrialResult,
}

impl TrialRecord {
    /// Pass a successful record through, turn a failed one into the run's error.
    pub fn check(self, step: &str) -> Result<Self, CheckError> {
        match self.result {
            TrialResult::Success(_) => Ok(self),
            TrialResult::ExecutionError(source) => Err(CheckError::Execution {
                trial: self.trial,
                source,
            }),
            TrialResult::MismatchError { expected, actual } => Err(CheckError::Mismatch {
                trial: self.trial,
                step: step.to_string(),
                expected,
                actual,
                instance_dir: self
                    .artifacts
                    .map(|artifacts| artifacts.instance_dir)
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Summary of a run in which every trial passed.
#[derive(Debug)]
pub struct RunReport {
    pub seed: u64,
    pub trials: Vec<TrialRecord>,
}

/// Validate the workflow shape, then run `options.trials` trials.
///
/// Progress (seed, inputs, per-trial verdict) is written to `out`.
#[instrument(skip_all, fields(seed = options.seed, trials = options.trials))]
pub fn run_check<L: WorkflowLoader, E: Engine>(
    loader: &L,
    engine: &E,
    config: &CheckConfig,
    options: &CheckOptions,
    out: &mut dyn Write,
) -> Result<RunReport, CheckError> {
    let trials = usize::try_from(options.trials).map_err(|_| {
        CheckError::config(format!(
            "number of trials must be non-negative, got {}",
            options.trials
        ))
    })?;
    config
        .validate()
        .map_err(|err| CheckError::config(format!("{err:#}")))?;

    validate_workflow(loader, &options.workflow_path, &config.shape.expectations())?;
    info!("workflow shape checked");

    report_line(out, format_args!("Seed for the runs {}", options.seed));
    let mut generator = InputGenerator::seeded(options.seed, config.inputs.values());
    let driver = Driver::new(engine, config, &options.workflow_path, &options.workdir);

    let mut records = Vec::with_capacity(trials);
    for trial in 1..=trials {
        let window = generator
            .choose_window(config.inputs.max_length)
            .ok_or_else(|| CheckError::config("inputs.max_length must be >= 2"))?;
        let matrix = match &options.numbers {
            Some(numbers) => numbers.clone(),
            None => generator.generate(config.inputs.max_length, config.inputs.entry_length),
        };

        let record = run_trial(&driver, trial, matrix, window, out).check(&config.shape.step)?;
        if let TrialResult::Success(value) = record.result {
            report_line(out, format_args!("Run computed the correct value {value}\n"));
        }
        if options.cleanup_on_success
            && let Some(artifacts) = &record.artifacts
        {
            artifacts.remove();
        }
        records.push(record);
    }

    info!(trials, "all trials passed");
    Ok(RunReport {
        seed: options.seed,
        trials: records,
    })
}

/// Execute one trial and compare its output to the reference value.
///
/// Never cleans up; the caller decides what happens to the artifacts.
#[instrument(skip_all, fields(trial = trial))]
pub fn run_trial<E: Engine>(
    driver: &Driver<'_, E>,
    trial: usize,
    matrix: NumericMatrix,
    window: ParameterWindow,
    out: &mut dyn Write,
) -> TrialRecord {
    let expected = calculate(&matrix, window.index_start, window.length);
    let step = &driver.config().shape.step;

    let (artifacts, result) = match driver.execute(&matrix, window, out) {
        Ok(artifacts) => {
            let result = match artifacts.read_result(step) {
                Ok(actual) => classify_trial(expected, actual),
                Err(err) => TrialResult::ExecutionError(err),
            };
            (Some(artifacts), result)
        }
        Err(err) => (None, TrialResult::ExecutionError(err)),
    };
    debug!(expected, result = ?result, "trial finished");

    TrialRecord {
        trial,
        window,
        matrix,
        artifacts,
        result,
    }
}

fn report_line(out: &mut dyn Write, line: std::fmt::Arguments<'_>) {
    if let Err(err) = writeln!(out, "{line}") {
        warn!(err = %err, "failed to write progress");
    }
}
