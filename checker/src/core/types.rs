//! Shared deterministic types for checker core logic.
//!
//! These types define the contract between the input generator, the reference
//! calculator and the execution driver. They live for a single trial.

use serde::{Deserialize, Serialize};

/// Rows of integers fed to the workflow. Every row has the same length.
pub type NumericMatrix = Vec<Vec<i64>>;

/// Window of rows the workflow must reduce: `matrix[index_start..index_start + length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterWindow {
    pub index_start: usize,
    pub length: usize,
}

impl ParameterWindow {
    /// True if the window is non-empty, never starts at row 0, and ends within
    /// a matrix of `max_length` rows.
    pub fn fits(&self, max_length: usize) -> bool {
        self.index_start >= 1
            && self.index_start < max_length
            && self.length >= 1
            && self.length <= max_length - self.index_start
    }
}
