//! Test-only fakes for the workflow loader and the engine.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::core::reference::calculate;
use crate::core::shape::{Entrypoint, ExecuteEdge, Signature, Workflow, WorkflowConfig, WorkflowGraph};
use crate::core::types::NumericMatrix;
use crate::io::artifacts::{ExecutionArtifacts, Variables};
use crate::io::config::ShapeConfig;
use crate::io::engine::{Engine, LaunchOutcome, LaunchRequest};
use crate::io::loader::WorkflowLoader;

/// DSL 2.0 definition with the shape the tutorial expects.
pub const SAMPLE_DSL: &str = r#"
entrypoint:
  entry-instance: calculate-sum-of-products
  execute:
    - target: <entry-instance>
      args:
        numbers: input/numbers.json
        variables: input/variables.yaml
workflows:
  - signature:
      name: calculate-sum-of-products
      parameters:
        - name: numbers
        - name: variables
    steps:
      sum-products: sum-products
    execute:
      - target: <sum-products>
        args:
          numbers: "%(numbers)s"
components:
  - signature:
      name: sum-products
    command:
      executable: python3
      arguments: bin/sum_products.py
"#;

/// Entry workflow with one `sum-products` step executed once.
pub fn sample_workflow() -> Workflow {
    Workflow {
        signature: Signature {
            name: "calculate-sum-of-products".to_string(),
        },
        steps: BTreeMap::from([("sum-products".to_string(), "sum-products".to_string())]),
        execute: vec![ExecuteEdge {
            target: "<sum-products>".to_string(),
        }],
    }
}

/// Graph whose entrypoint instantiates [`sample_workflow`].
pub fn sample_graph() -> WorkflowGraph {
    WorkflowGraph {
        entrypoint: Entrypoint {
            entry_instance: "calculate-sum-of-products".to_string(),
        },
        workflows: vec![sample_workflow()],
    }
}

/// Loader that returns a canned configuration (or error) for any path.
#[derive(Debug)]
pub struct StaticLoader {
    config: std::result::Result<WorkflowConfig, String>,
    calls: Cell<usize>,
}

impl StaticLoader {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config: Ok(config),
            calls: Cell::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            config: Err(message.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl WorkflowLoader for StaticLoader {
    fn load(&self, _path: &Path) -> Result<WorkflowConfig> {
        self.calls.set(self.calls.get() + 1);
        self.config.clone().map_err(|message| anyhow!(message))
    }
}

/// What a [`ScriptedEngine`] does on one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedLaunch {
    /// Read the input files and write the reference value.
    Correct,
    /// Write this value.
    Value(i64),
    /// Write these bytes verbatim.
    Raw(String),
    /// Exit 0 without writing the output file.
    NoOutput,
    /// Exit with this code without writing the output file.
    Exit(i32),
    /// Report a timeout.
    TimedOut,
}

/// Engine that plays back a queue of scripted launches.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: RefCell<VecDeque<ScriptedLaunch>>,
    launches: RefCell<Vec<String>>,
    shape: ShapeConfig,
}

impl ScriptedEngine {
    pub fn new(script: Vec<ScriptedLaunch>) -> Self {
        Self::with_shape(script, ShapeConfig::default())
    }

    /// Engine writing to the step and output file named in `shape`.
    pub fn with_shape(script: Vec<ScriptedLaunch>, shape: ShapeConfig) -> Self {
        Self {
            script: RefCell::new(script.into()),
            launches: RefCell::new(Vec::new()),
            shape,
        }
    }

    /// Instance names launched so far, in order.
    pub fn launches(&self) -> Vec<String> {
        self.launches.borrow().clone()
    }
}

impl Engine for ScriptedEngine {
    fn launch(&self, request: &LaunchRequest) -> Result<LaunchOutcome> {
        let next = self
            .script
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted launch left"))?;
        self.launches
            .borrow_mut()
            .push(request.instance_name.clone());

        let artifacts = ExecutionArtifacts::new(
            &request.workdir,
            &request.instance_name,
            &self.shape.step,
            &self.shape.output_file,
        );
        let contents = match next {
            ScriptedLaunch::Correct => reference_from_inputs(request)?.to_string(),
            ScriptedLaunch::Value(value) => value.to_string(),
            ScriptedLaunch::Raw(raw) => raw,
            ScriptedLaunch::NoOutput => {
                fs::create_dir_all(&artifacts.instance_dir)?;
                return Ok(LaunchOutcome::exited(0));
            }
            ScriptedLaunch::Exit(code) => {
                fs::create_dir_all(&artifacts.instance_dir)?;
                return Ok(LaunchOutcome::exited(code));
            }
            ScriptedLaunch::TimedOut => {
                return Ok(LaunchOutcome {
                    exit_code: None,
                    timed_out: true,
                });
            }
        };

        let parent = artifacts
            .output_path
            .parent()
            .ok_or_else(|| anyhow!("output path has no parent"))?;
        fs::create_dir_all(parent)?;
        fs::write(&artifacts.output_path, contents)?;
        Ok(LaunchOutcome::exited(0))
    }
}

fn reference_from_inputs(request: &LaunchRequest) -> Result<i64> {
    let numbers: NumericMatrix = serde_json::from_str(
        &fs::read_to_string(&request.numbers_path).context("read numbers")?,
    )
    .context("parse numbers")?;
    let variables: Variables = serde_yaml::from_str(
        &fs::read_to_string(&request.variables_path).context("read variables")?,
    )
    .context("parse variables")?;
    Ok(calculate(
        &numbers,
        variables.global.index_start,
        variables.global.length,
    ))
}
