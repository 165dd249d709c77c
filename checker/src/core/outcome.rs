use crate::error::ExecutionError;

/// Outcome of a single trial.
///
/// Shape violations are not per-trial: they abort the run before the first
/// trial and surface as [`crate::error::CheckError::Shape`].
#[derive(Debug)]
pub enum TrialResult {
    /// The workflow produced the reference value.
    Success(i64),
    /// The engine failed or did not produce a usable artifact.
    ExecutionError(ExecutionError),
    /// The workflow produced a value other than the reference value.
    MismatchError { expected: i64, actual: i64 },
}

impl TrialResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TrialResult::Success(_))
    }
}

/// Compare the engine's value to the reference value by exact equality.
pub fn classify_trial(expected: i64, actual: i64) -> TrialResult {
    if expected == actual {
        TrialResult::Success(actual)
    } else {
        TrialResult::MismatchError { expected, actual }
    }
}
