//! On-disk files of a single trial.
//!
//! Layout relative to the working directory:
//!
//! ```text
//! numbers.json                      matrix, overwritten every trial
//! variables.yaml                    {global: {index_start, length}}
//! <instance>.instance/
//!   check_homework.log              engine stdout/stderr
//!   stages/stage0/<step>/<file>     answer written by the workflow
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::types::{NumericMatrix, ParameterWindow};
use crate::error::ExecutionError;

pub const NUMBERS_FILE: &str = "numbers.json";
pub const VARIABLES_FILE: &str = "variables.yaml";
pub const ENGINE_LOG_FILE: &str = "check_homework.log";

/// Parameter file handed to the engine as auxiliary input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables {
    pub global: ParameterWindow,
}

/// Paths produced or consumed by one engine launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionArtifacts {
    pub instance_name: String,
    pub instance_dir: PathBuf,
    pub numbers_path: PathBuf,
    pub variables_path: PathBuf,
    /// Where the workflow step must write its answer.
    pub output_path: PathBuf,
}

impl ExecutionArtifacts {
    pub fn new(workdir: &Path, instance_name: &str, step: &str, output_file: &str) -> Self {
        let instance_dir = instance_dir(workdir, instance_name);
        let output_path = instance_dir
            .join("stages")
            .join("stage0")
            .join(step)
            .join(output_file);
        Self {
            instance_name: instance_name.to_string(),
            instance_dir,
            numbers_path: workdir.join(NUMBERS_FILE),
            variables_path: workdir.join(VARIABLES_FILE),
            output_path,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.instance_dir.join(ENGINE_LOG_FILE)
    }

    /// Write the matrix and parameter window the engine reads.
    pub fn write_inputs(&self, matrix: &NumericMatrix, window: ParameterWindow) -> Result<()> {
        let numbers = render_numbers(matrix)?;
        fs::write(&self.numbers_path, numbers)
            .with_context(|| format!("write {}", self.numbers_path.display()))?;
        let variables = render_variables(window)?;
        fs::write(&self.variables_path, variables)
            .with_context(|| format!("write {}", self.variables_path.display()))?;
        Ok(())
    }

    /// Read the integer the workflow step wrote.
    pub fn read_result(&self, step: &str) -> Result<i64, ExecutionError> {
        if !self.output_path.is_file() {
            return Err(ExecutionError::MissingArtifact {
                step: step.to_string(),
                path: self.output_path.clone(),
            });
        }
        let contents = fs::read_to_string(&self.output_path)
            .with_context(|| format!("read {}", self.output_path.display()))
            .map_err(ExecutionError::Io)?;
        parse_result(&contents).map_err(|reason| ExecutionError::MalformedArtifact {
            step: step.to_string(),
            path: self.output_path.clone(),
            reason,
        })
    }

    /// Delete the instance directory and both input files.
    ///
    /// Best effort: failures are logged, never returned.
    pub fn remove(&self) {
        if self.instance_dir.exists()
            && let Err(err) = fs::remove_dir_all(&self.instance_dir)
        {
            warn!(err = %err, path = %self.instance_dir.display(), "failed to remove instance dir");
        }
        for path in [&self.numbers_path, &self.variables_path] {
            if path.exists()
                && let Err(err) = fs::remove_file(path)
            {
                warn!(err = %err, path = %path.display(), "failed to remove input file");
            }
        }
        debug!(instance = %self.instance_name, "artifacts removed");
    }
}

/// Fresh instance name, unique per launch.
pub fn new_instance_name() -> String {
    format!("exercise-{}", Uuid::new_v4())
}

pub fn instance_dir(workdir: &Path, instance_name: &str) -> PathBuf {
    workdir.join(format!("{instance_name}.instance"))
}

pub fn render_numbers(matrix: &NumericMatrix) -> Result<String> {
    serde_json::to_string(matrix).context("serialize numbers")
}

pub fn render_variables(window: ParameterWindow) -> Result<String> {
    serde_yaml::to_string(&Variables { global: window }).context("serialize variables")
}

fn parse_result(contents: &str) -> Result<i64, String> {
    let value: serde_json::Value =
        serde_json::from_str(contents).map_err(|err| format!("invalid JSON: {err}"))?;
    value
        .as_i64()
        .ok_or_else(|| format!("expected an integer, found {value}"))
}
