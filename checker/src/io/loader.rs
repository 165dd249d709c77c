//! Workflow loader abstraction.
//!
//! The [`WorkflowLoader`] trait decouples shape validation from how workflow
//! definitions are found and parsed. [`DslLoader`] reads YAML definitions from
//! disk; tests use a static loader that returns a canned [`WorkflowConfig`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::shape::{WorkflowConfig, WorkflowGraph};

/// DSL 2.0 definition inside a workflow package.
const PACKAGE_DSL: &str = "conf/dsl.yaml";
/// FlowIR definition inside a workflow package.
const PACKAGE_FLOWIR: &str = "conf/flowir_package.yaml";

/// Abstraction over workflow definition loaders.
pub trait WorkflowLoader {
    /// Load the workflow at `path` (a package directory or a definition file).
    fn load(&self, path: &Path) -> Result<WorkflowConfig>;
}

/// Loads DSL 2.0 workflow definitions written in YAML.
///
/// A package directory resolves to `conf/dsl.yaml`, falling back to
/// `conf/flowir_package.yaml`; any other path is read as a definition file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslLoader;

impl WorkflowLoader for DslLoader {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<WorkflowConfig> {
        let definition = resolve_definition(path)?;
        debug!(definition = %definition.display(), "reading workflow definition");
        let contents = fs::read_to_string(&definition)
            .with_context(|| format!("read {}", definition.display()))?;
        parse_definition(&contents).with_context(|| format!("parse {}", definition.display()))
    }
}

/// Parse a YAML workflow definition.
///
/// Documents with a top-level `entrypoint` are DSL 2.0; any other mapping is
/// reported as FlowIR, anything else as an unrecognised dialect.
pub fn parse_definition(contents: &str) -> Result<WorkflowConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(contents).context("parse yaml")?;
    let dialect = match value.as_mapping() {
        Some(mapping) if mapping.contains_key("entrypoint") => None,
        Some(_) => Some("FlowIR"),
        None => Some("unrecognised configuration"),
    };
    if let Some(dialect) = dialect {
        return Ok(WorkflowConfig::Other {
            dialect: dialect.to_string(),
        });
    }
    let graph: WorkflowGraph = serde_yaml::from_value(value).context("parse DSL 2.0 workflow")?;
    Ok(WorkflowConfig::Dsl(graph))
}

fn resolve_definition(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(anyhow!("workflow path {} does not exist", path.display()));
    }
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    for candidate in [PACKAGE_DSL, PACKAGE_FLOWIR] {
        let definition = path.join(candidate);
        if definition.is_file() {
            return Ok(definition);
        }
    }
    Err(anyhow!(
        "package {} has neither {} nor {}",
        path.display(),
        PACKAGE_DSL,
        PACKAGE_FLOWIR
    ))
}
