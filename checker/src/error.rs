//! Failure taxonomy for a checker run.
//!
//! No failure is retried. Every variant carries enough context (instance
//! directory, reference vs. produced value, or the specific shape violation)
//! to reproduce and debug the run by hand.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// The workflow definition does not match the structure the tutorial expects.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("could not load workflow {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("the workflow does not use the DSL 2.0 syntax (found {dialect})")]
    WrongDialect { dialect: String },

    #[error("the entrypoint does not point to a workflow: no workflow is called '{entry_instance}'")]
    NoEntrypointWorkflow { entry_instance: String },

    #[error("the entrypoint is ambiguous: {count} workflows are called '{entry_instance}'")]
    AmbiguousEntrypoint { entry_instance: String, count: usize },

    #[error("entry-instance workflow is called '{found}' instead of '{expected}'")]
    WrongWorkflowName { expected: String, found: String },

    #[error("workflow '{workflow}' is missing a step called '{step}'")]
    MissingStep { workflow: String, step: String },

    #[error("workflow '{workflow}' executes {target} {count} times, expected exactly once")]
    StepExecutionCount {
        workflow: String,
        target: String,
        count: usize,
    },
}

/// The engine could not produce a usable result for a trial.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(
        "experiment did not finish ({}), troubleshoot your experiment instance {} (engine log: {})",
        describe_exit(.exit_code),
        .instance_dir.display(),
        .log_path.display()
    )]
    EngineFailed {
        instance_dir: PathBuf,
        log_path: PathBuf,
        exit_code: Option<i32>,
    },

    #[error(
        "experiment timed out after {timeout_secs}s, troubleshoot your experiment instance {}",
        .instance_dir.display()
    )]
    TimedOut {
        instance_dir: PathBuf,
        timeout_secs: u64,
    },

    #[error("your step {step} did not produce the file {}", .path.display())]
    MissingArtifact { step: String, path: PathBuf },

    #[error("your step {step} wrote {} but it does not hold a JSON integer: {reason}", .path.display())]
    MalformedArtifact {
        step: String,
        path: PathBuf,
        reason: String,
    },

    #[error("{0:#}")]
    Io(anyhow::Error),
}

/// Why a whole checker run failed.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("workflow shape check failed: {0}")]
    Shape(#[from] ShapeError),

    #[error("trial {trial} failed: {source}")]
    Execution {
        trial: usize,
        #[source]
        source: ExecutionError,
    },

    #[error(
        "trial {trial} failed: your step {step} computed the wrong answer {actual} instead of {expected}, troubleshoot your experiment instance {}",
        .instance_dir.display()
    )]
    Mismatch {
        trial: usize,
        step: String,
        expected: i64,
        actual: i64,
        instance_dir: PathBuf,
    },
}

impl CheckError {
    /// Exit code the CLI reports for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckError::Config(_) => exit_codes::CONFIG,
            CheckError::Shape(_) => exit_codes::SHAPE,
            CheckError::Execution { .. } => exit_codes::EXECUTION,
            CheckError::Mismatch { .. } => exit_codes::MISMATCH,
        }
    }

    pub fn config(err: impl std::fmt::Display) -> Self {
        CheckError::Config(err.to_string())
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        assert_eq!(CheckError::Config("x".into()).exit_code(), exit_codes::CONFIG);
        let shape = CheckError::from(ShapeError::WrongDialect {
            dialect: "FlowIR".into(),
        });
        assert_eq!(shape.exit_code(), exit_codes::SHAPE);
        let execution = CheckError::Execution {
            trial: 1,
            source: ExecutionError::MissingArtifact {
                step: "sum-products".into(),
                path: PathBuf::from("out.json"),
            },
        };
        assert_eq!(execution.exit_code(), exit_codes::EXECUTION);
    }

    #[test]
    fn engine_failure_names_instance_dir() {
        let err = ExecutionError::EngineFailed {
            instance_dir: PathBuf::from("exercise-1.instance"),
            log_path: PathBuf::from("exercise-1.instance/check_homework.log"),
            exit_code: Some(1),
        };
        let message = err.to_string();
        assert!(message.contains("exit code 1"));
        assert!(message.contains("exercise-1.instance"));
    }

    #[test]
    fn mismatch_cites_both_values() {
        let err = CheckError::Mismatch {
            trial: 2,
            step: "sum-products".into(),
            expected: 21,
            actual: 20,
            instance_dir: PathBuf::from("exercise-2.instance"),
        };
        let message = err.to_string();
        assert!(message.contains("wrong answer 20 instead of 21"));
        assert!(message.contains("trial 2"));
    }
}
