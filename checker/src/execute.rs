//! Execution driver: one engine launch per call.
//!
//! Writes the trial inputs to the working directory, launches the engine
//! synchronously, and confirms the step produced its output file. Nothing is
//! retried and nothing is cleaned up here.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::core::types::{NumericMatrix, ParameterWindow};
use crate::error::ExecutionError;
use crate::io::artifacts::{
    ExecutionArtifacts, NUMBERS_FILE, VARIABLES_FILE, new_instance_name, render_numbers,
    render_variables,
};
use crate::io::config::CheckConfig;
use crate::io::engine::{Engine, LaunchRequest};

/// Launches one workflow against one set of inputs.
#[derive(Debug)]
pub struct Driver<'a, E> {
    engine: &'a E,
    config: &'a CheckConfig,
    workflow_path: &'a Path,
    workdir: &'a Path,
}

impl<'a, E: Engine> Driver<'a, E> {
    pub fn new(
        engine: &'a E,
        config: &'a CheckConfig,
        workflow_path: &'a Path,
        workdir: &'a Path,
    ) -> Self {
        Self {
            engine,
            config,
            workflow_path,
            workdir,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        self.config
    }

    /// Run the workflow on `matrix` and `window` under a fresh instance name.
    ///
    /// Echoes the inputs to `out` before launching. Returns the artifacts once
    /// the engine exited cleanly and the step's output file exists.
    #[instrument(skip_all, fields(window = ?window))]
    pub fn execute(
        &self,
        matrix: &NumericMatrix,
        window: ParameterWindow,
        out: &mut dyn Write,
    ) -> Result<ExecutionArtifacts, ExecutionError> {
        let shape = &self.config.shape;
        let instance_name = new_instance_name();
        let artifacts =
            ExecutionArtifacts::new(self.workdir, &instance_name, &shape.step, &shape.output_file);

        artifacts
            .write_inputs(matrix, window)
            .map_err(ExecutionError::Io)?;
        self.echo_inputs(matrix, window, out)
            .map_err(ExecutionError::Io)?;

        let request = LaunchRequest {
            workdir: self.workdir.to_path_buf(),
            workflow_path: self.workflow_path.to_path_buf(),
            numbers_path: artifacts.numbers_path.clone(),
            variables_path: artifacts.variables_path.clone(),
            instance_name: instance_name.clone(),
            log_path: artifacts.log_path(),
            timeout: self.config.engine.timeout(),
            output_limit_bytes: self.config.engine.output_limit_bytes,
        };
        info!(instance = %instance_name, "launching workflow");
        let outcome = self
            .engine
            .launch(&request)
            .map_err(ExecutionError::Io)?;

        if outcome.timed_out {
            return Err(ExecutionError::TimedOut {
                instance_dir: artifacts.instance_dir.clone(),
                timeout_secs: self.config.engine.timeout_secs.unwrap_or_default(),
            });
        }
        if !outcome.success() {
            return Err(ExecutionError::EngineFailed {
                instance_dir: artifacts.instance_dir.clone(),
                log_path: request.log_path,
                exit_code: outcome.exit_code,
            });
        }
        if !artifacts.output_path.is_file() {
            return Err(ExecutionError::MissingArtifact {
                step: shape.step.clone(),
                path: artifacts.output_path.clone(),
            });
        }

        debug!(output = %artifacts.output_path.display(), "workflow produced output");
        Ok(artifacts)
    }

    fn echo_inputs(
        &self,
        matrix: &NumericMatrix,
        window: ParameterWindow,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let numbers = render_numbers(matrix)?;
        let variables = render_variables(window)?;
        write!(
            out,
            "Will run {} with\nContents of {NUMBERS_FILE}\n{numbers}\nContents of {VARIABLES_FILE}\n{variables}",
            self.workflow_path.display()
        )
        .context("write trial inputs")?;
        Ok(())
    }
}
