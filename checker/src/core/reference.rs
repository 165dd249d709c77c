//! Reference calculator: the oracle the workflow's output is compared against.

use crate::core::types::NumericMatrix;

/// Sum of row products over `matrix[index_start..index_start + length]`.
///
/// An empty row contributes 1. A window reaching past the end of the matrix
/// covers only the rows that exist. Arithmetic saturates at the `i64` bounds.
pub fn calculate(matrix: &NumericMatrix, index_start: usize, length: usize) -> i64 {
    let end = index_start.saturating_add(length).min(matrix.len());
    let start = index_start.min(end);
    matrix[start..end]
        .iter()
        .map(|row| row_product(row))
        .fold(0i64, i64::saturating_add)
}

fn row_product(row: &[i64]) -> i64 {
    row.iter().fold(1i64, |product, value| product.saturating_mul(*value))
}
