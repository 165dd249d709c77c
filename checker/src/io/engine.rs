//! Engine abstraction for workflow launches.
//!
//! The [`Engine`] trait decouples the execution driver from the actual
//! workflow engine (`elaunch.py` by default). Tests use scripted engines that
//! write predetermined artifacts without spawning processes.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::process::{CommandOutput, run_command};

/// Parameters for one engine launch.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Working directory for the engine process; the instance directory is created here.
    pub workdir: PathBuf,
    /// Workflow package or definition to run.
    pub workflow_path: PathBuf,
    /// Primary input: the matrix file.
    pub numbers_path: PathBuf,
    /// Auxiliary input: the parameter file.
    pub variables_path: PathBuf,
    /// Instance name; the engine writes to `<instance_name>.instance`.
    pub instance_name: String,
    /// Path to write engine stdout/stderr log.
    pub log_path: PathBuf,
    /// Kill the engine after this long. `None` waits for it to exit.
    pub timeout: Option<Duration>,
    /// Truncate engine output logs beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// How an engine launch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Exit code, `None` when the engine was terminated by a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl LaunchOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            timed_out: false,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Abstraction over workflow engines.
pub trait Engine {
    /// Run the workflow to completion. The workflow's step output must land
    /// inside `<request.workdir>/<request.instance_name>.instance`.
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchOutcome>;
}

/// Engine that spawns the `elaunch.py` command line.
#[derive(Debug, Clone)]
pub struct ElaunchEngine {
    command: Vec<String>,
}

impl ElaunchEngine {
    /// `command` is the program followed by any leading arguments.
    pub fn new(command: Vec<String>) -> Result<Self> {
        match command.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self { command }),
            _ => Err(anyhow!("engine command must be a non-empty array")),
        }
    }

    /// Arguments passed after the configured command.
    pub fn launch_args(request: &LaunchRequest) -> Vec<OsString> {
        vec![
            "-i".into(),
            request.numbers_path.clone().into_os_string(),
            "-a".into(),
            request.variables_path.clone().into_os_string(),
            "--nostamp".into(),
            "--instanceName".into(),
            request.instance_name.clone().into(),
            request.workflow_path.clone().into_os_string(),
        ]
    }
}

impl Engine for ElaunchEngine {
    #[instrument(skip_all, fields(instance = %request.instance_name))]
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchOutcome> {
        info!(workdir = %request.workdir.display(), "starting engine");

        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .args(Self::launch_args(request))
            .current_dir(&request.workdir);

        let output = run_command(cmd, request.timeout, request.output_limit_bytes)
            .with_context(|| format!("run {}", self.command[0]))?;

        write_engine_log(&request.log_path, &output)?;

        if output.timed_out {
            warn!("engine timed out");
        } else if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "engine failed");
        } else {
            debug!("engine completed successfully");
        }
        Ok(LaunchOutcome {
            exit_code: output.status.code(),
            timed_out: output.timed_out,
        })
    }
}

fn write_engine_log(path: &Path, output: &CommandOutput) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create engine log dir {}", parent.display()))?;
    }
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    buf.push_str(&output.stdout_truncated_notice("engine"));
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    buf.push_str(&output.stderr_truncated_notice("engine"));
    if output.timed_out {
        buf.push_str("\n[engine timed out]\n");
    }
    fs::write(path, buf).with_context(|| format!("write engine log {}", path.display()))
}
