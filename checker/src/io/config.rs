//! Checker configuration, optionally stored in `check_homework.toml`.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::shape::{ShapeExpectations, step_reference};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "check_homework.toml";

/// Checker configuration (TOML).
///
/// Every field has a default matching the sum-of-products tutorial, so an
/// absent file or a partial file is valid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckConfig {
    pub engine: EngineConfig,
    pub inputs: InputConfig,
    pub shape: ShapeConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Program (plus leading arguments) that launches a workflow.
    pub command: Vec<String>,

    /// Kill the engine after this many seconds. Unset waits forever.
    pub timeout_secs: Option<u64>,

    /// Truncate engine stdout/stderr logs beyond this many bytes.
    pub output_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    /// Rows per generated matrix; windows are drawn against this size.
    pub max_length: usize,
    /// Values per row.
    pub entry_length: usize,
    pub value_min: i64,
    pub value_max: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShapeConfig {
    /// Required name of the entry-instance workflow.
    pub entrypoint: String,
    /// Step that computes the answer.
    pub step: String,
    /// Execution edge target; defaults to `<step>`.
    pub edge_target: Option<String>,
    /// File the step writes its answer to.
    pub output_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: vec!["elaunch.py".to_string()],
            timeout_secs: None,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_length: 10,
            entry_length: 4,
            value_min: 1,
            value_max: 10,
        }
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            entrypoint: "calculate-sum-of-products".to_string(),
            step: "sum-products".to_string(),
            edge_target: None,
            output_file: "sum_of_products.json".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl InputConfig {
    pub fn values(&self) -> RangeInclusive<i64> {
        self.value_min..=self.value_max
    }
}

impl ShapeConfig {
    pub fn expectations(&self) -> ShapeExpectations {
        ShapeExpectations {
            entrypoint: self.entrypoint.clone(),
            step: self.step.clone(),
            edge_target: self
                .edge_target
                .clone()
                .unwrap_or_else(|| step_reference(&self.step)),
        }
    }
}

impl CheckConfig {
    pub fn validate(&self) -> Result<()> {
        if self.engine.command.is_empty() || self.engine.command[0].trim().is_empty() {
            return Err(anyhow!("engine.command must be a non-empty array"));
        }
        if self.engine.timeout_secs == Some(0) {
            return Err(anyhow!("engine.timeout_secs must be > 0"));
        }
        if self.engine.output_limit_bytes == 0 {
            return Err(anyhow!("engine.output_limit_bytes must be > 0"));
        }
        if self.inputs.max_length < 2 {
            return Err(anyhow!("inputs.max_length must be >= 2"));
        }
        if self.inputs.value_min > self.inputs.value_max {
            return Err(anyhow!("inputs.value_min must be <= inputs.value_max"));
        }
        for (key, value) in [
            ("shape.entrypoint", &self.shape.entrypoint),
            ("shape.step", &self.shape.step),
            ("shape.output_file", &self.shape.output_file),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{key} must be non-empty"));
            }
        }
        if let Some(target) = &self.shape.edge_target
            && target.trim().is_empty()
        {
            return Err(anyhow!("shape.edge_target must be non-empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CheckConfig::default()`.
pub fn load_config(path: &Path) -> Result<CheckConfig> {
    if !path.exists() {
        let cfg = CheckConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CheckConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
