//! Workflow shape validation: load the definition, then apply the shape rules.

use std::path::Path;

use tracing::{debug, instrument};

use crate::core::shape::{ShapeExpectations, check_shape};
use crate::error::ShapeError;
use crate::io::loader::WorkflowLoader;

/// Load the workflow at `path` and check it against `expected`.
///
/// A loader failure is reported as [`ShapeError::Load`]; the loaded
/// configuration is only read, never modified.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn validate_workflow<L: WorkflowLoader>(
    loader: &L,
    path: &Path,
    expected: &ShapeExpectations,
) -> Result<(), ShapeError> {
    let config = loader.load(path).map_err(|err| ShapeError::Load {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    })?;
    check_shape(&config, expected)?;
    debug!("workflow shape ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::WorkflowConfig;
    use crate::test_support::{StaticLoader, sample_graph};

    fn expectations() -> ShapeExpectations {
        ShapeExpectations::new("calculate-sum-of-products", "sum-products")
    }

    #[test]
    fn validate_ok_for_expected_graph() {
        let loader = StaticLoader::new(WorkflowConfig::Dsl(sample_graph()));
        validate_workflow(&loader, Path::new("sum.package"), &expectations()).expect("valid");
    }

    #[test]
    fn validate_reports_loader_failure() {
        let loader = StaticLoader::failing("no such package");
        let err =
            validate_workflow(&loader, Path::new("sum.package"), &expectations()).unwrap_err();
        assert!(matches!(err, ShapeError::Load { .. }));
        assert!(err.to_string().contains("no such package"));
    }

    #[test]
    fn validate_reports_shape_violation() {
        let mut graph = sample_graph();
        graph.workflows[0].steps.clear();
        let loader = StaticLoader::new(WorkflowConfig::Dsl(graph));
        let err =
            validate_workflow(&loader, Path::new("sum.package"), &expectations()).unwrap_err();
        assert!(matches!(err, ShapeError::MissingStep { .. }));
    }
}
