//! Structural rules a workflow definition must satisfy before any trial runs.
//!
//! The rules operate on an already-loaded [`WorkflowConfig`]; loading lives in
//! [`crate::io::loader`].

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ShapeError;

/// Loaded workflow definition, as returned by a workflow loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowConfig {
    /// A DSL 2.0 workflow graph.
    Dsl(WorkflowGraph),
    /// Any other configuration dialect, named for diagnostics.
    Other { dialect: String },
}

/// DSL 2.0 workflow graph. Fields the checker does not inspect are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowGraph {
    pub entrypoint: Entrypoint,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entrypoint {
    /// Name of the workflow the entrypoint instantiates.
    #[serde(rename = "entry-instance")]
    pub entry_instance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub signature: Signature,
    /// Step name -> name of the workflow or component it instantiates.
    #[serde(default)]
    pub steps: BTreeMap<String, String>,
    /// Execution edges, one per step execution.
    #[serde(default)]
    pub execute: Vec<ExecuteEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Signature {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecuteEdge {
    /// Step reference, e.g. `<sum-products>`.
    pub target: String,
}

/// Identifiers the entry workflow must expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeExpectations {
    /// Required name of the entry-instance workflow.
    pub entrypoint: String,
    /// Step that must exist in that workflow.
    pub step: String,
    /// Reference exactly one execution edge must target.
    pub edge_target: String,
}

impl ShapeExpectations {
    /// Expectations whose edge target is the reference to `step` itself.
    pub fn new(entrypoint: impl Into<String>, step: impl Into<String>) -> Self {
        let step = step.into();
        Self {
            entrypoint: entrypoint.into(),
            edge_target: step_reference(&step),
            step,
        }
    }
}

/// DSL reference to a step: `<step>`.
pub fn step_reference(step: &str) -> String {
    format!("<{step}>")
}

/// Check that `config` is a DSL 2.0 graph whose entry workflow has the
/// expected name, contains the expected step, and executes it exactly once.
///
/// Rules are checked in order and the first violation is returned.
pub fn check_shape(config: &WorkflowConfig, expected: &ShapeExpectations) -> Result<(), ShapeError> {
    let graph = match config {
        WorkflowConfig::Dsl(graph) => graph,
        WorkflowConfig::Other { dialect } => {
            return Err(ShapeError::WrongDialect {
                dialect: dialect.clone(),
            });
        }
    };

    let entry_instance = &graph.entrypoint.entry_instance;
    let matches: Vec<&Workflow> = graph
        .workflows
        .iter()
        .filter(|workflow| &workflow.signature.name == entry_instance)
        .collect();
    let workflow = match matches.as_slice() {
        [workflow] => *workflow,
        [] => {
            return Err(ShapeError::NoEntrypointWorkflow {
                entry_instance: entry_instance.clone(),
            });
        }
        many => {
            return Err(ShapeError::AmbiguousEntrypoint {
                entry_instance: entry_instance.clone(),
                count: many.len(),
            });
        }
    };

    let name = &workflow.signature.name;
    if name != &expected.entrypoint {
        return Err(ShapeError::WrongWorkflowName {
            expected: expected.entrypoint.clone(),
            found: name.clone(),
        });
    }

    if !workflow.steps.contains_key(&expected.step) {
        return Err(ShapeError::MissingStep {
            workflow: name.clone(),
            step: expected.step.clone(),
        });
    }

    let count = workflow
        .execute
        .iter()
        .filter(|edge| edge.target == expected.edge_target)
        .count();
    if count != 1 {
        return Err(ShapeError::StepExecutionCount {
            workflow: name.clone(),
            target: expected.edge_target.clone(),
            count,
        });
    }

    Ok(())
}
