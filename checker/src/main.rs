//! `check-homework`: validate a sum-of-products workflow package.
//!
//! Checks the workflow's shape once, then runs it on randomly generated
//! inputs and compares every result with the reference value.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use checker::core::types::NumericMatrix;
use checker::error::CheckError;
use checker::io::config::{CheckConfig, DEFAULT_CONFIG_FILE, load_config};
use checker::io::engine::ElaunchEngine;
use checker::io::loader::DslLoader;
use checker::logging;
use checker::trial::{CheckOptions, run_check};
use clap::{ArgAction, Parser};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "check-homework",
    version,
    about = "Check that a sum-of-products workflow computes the right answer"
)]
struct Cli {
    /// Workflow package (or DSL file) to check.
    #[arg(long)]
    path: PathBuf,

    /// Seed for the random inputs. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trials to run.
    #[arg(
        long,
        visible_alias = "number-tests",
        default_value_t = 3,
        allow_negative_numbers = true
    )]
    trials: i64,

    /// Remove a passing trial's instance directory and input files.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    cleanup_on_success: bool,

    /// Checker configuration (TOML). Defaults to `check_homework.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON matrix to use in every trial instead of generated numbers.
    #[arg(long)]
    numbers: Option<PathBuf>,

    /// Program that launches a workflow; replaces `engine.command`.
    #[arg(long)]
    launcher: Option<String>,

    /// Kill the engine after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let mut stdout = std::io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(()) => {
            let _ = writeln!(stdout, "Congratulations! Your experiment works as expected");
        }
        Err(err) => {
            let _ = stdout.flush();
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CheckError> {
    let config = resolve_config(&cli)?;
    let numbers = match &cli.numbers {
        Some(path) => Some(read_numbers(path).map_err(|err| CheckError::config(format!("{err:#}")))?),
        None => None,
    };
    let workdir = std::env::current_dir()
        .context("resolve working directory")
        .map_err(|err| CheckError::config(format!("{err:#}")))?;

    let options = CheckOptions {
        workflow_path: cli.path,
        workdir,
        seed: cli
            .seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp().unsigned_abs()),
        trials: cli.trials,
        cleanup_on_success: cli.cleanup_on_success,
        numbers,
    };
    debug!(?options, "resolved options");

    let engine = ElaunchEngine::new(config.engine.command.clone())
        .map_err(|err| CheckError::config(format!("{err:#}")))?;
    run_check(&DslLoader, &engine, &config, &options, out)?;
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<CheckConfig, CheckError> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(CheckError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        Some(path) => load_config(path),
        None => load_config(Path::new(DEFAULT_CONFIG_FILE)),
    }
    .map_err(|err| CheckError::config(format!("{err:#}")))?;

    if let Some(launcher) = &cli.launcher {
        config.engine.command = vec![launcher.clone()];
    }
    if let Some(secs) = cli.timeout_secs {
        config.engine.timeout_secs = Some(secs);
    }
    config
        .validate()
        .map_err(|err| CheckError::config(format!("{err:#}")))?;
    Ok(config)
}

fn read_numbers(path: &Path) -> anyhow::Result<NumericMatrix> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {} as a JSON matrix", path.display()))
}
