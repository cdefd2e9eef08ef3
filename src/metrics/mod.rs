//! Evaluation metrics for classifier output.
//!
//! Per-column accuracy for single and multi-output targets, plus the
//! stricter whole-vector match used for sample-level reporting.

use crate::error::{HomeError, Result};
use crate::primitives::Matrix;

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Errors
///
/// Returns an error if the slices differ in length or are empty.
///
/// # Examples
///
/// ```
/// use homeauto::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true).expect("same length");
/// assert!((acc - 0.333333).abs() < 0.001);
/// ```
pub fn accuracy<T: PartialEq>(y_pred: &[T], y_true: &[T]) -> Result<f32> {
    if y_pred.len() != y_true.len() {
        return Err(HomeError::DimensionMismatch {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(HomeError::EmptyData(
            "accuracy needs at least one sample".to_string(),
        ));
    }

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    Ok(correct as f32 / y_true.len() as f32)
}

fn check_same_shape(y_pred: &Matrix<usize>, y_true: &Matrix<usize>) -> Result<()> {
    if y_pred.shape() != y_true.shape() {
        let (pr, pc) = y_pred.shape();
        let (tr, tc) = y_true.shape();
        return Err(HomeError::DimensionMismatch {
            expected: format!("{tr}x{tc}"),
            actual: format!("{pr}x{pc}"),
        });
    }
    Ok(())
}

/// Accuracy of each column of a multi-output prediction, scored independently.
///
/// # Errors
///
/// Returns an error if the tables differ in shape or have no rows.
pub fn column_accuracies(y_pred: &Matrix<usize>, y_true: &Matrix<usize>) -> Result<Vec<f32>> {
    check_same_shape(y_pred, y_true)?;
    (0..y_true.n_cols())
        .map(|c| accuracy(&y_pred.column(c), &y_true.column(c)))
        .collect()
}

/// Whether row `row` matches in every column.
///
/// # Panics
///
/// Panics if `row` is out of bounds for either table.
#[must_use]
pub fn rows_match(y_pred: &Matrix<usize>, y_true: &Matrix<usize>, row: usize) -> bool {
    y_pred.row(row) == y_true.row(row)
}

/// Fraction of rows whose whole predicted vector equals the actual vector.
///
/// # Errors
///
/// Returns an error if the tables differ in shape or have no rows.
pub fn exact_match_ratio(y_pred: &Matrix<usize>, y_true: &Matrix<usize>) -> Result<f32> {
    check_same_shape(y_pred, y_true)?;
    let n = y_true.n_rows();
    if n == 0 {
        return Err(HomeError::EmptyData(
            "exact match ratio needs at least one row".to_string(),
        ));
    }
    let matched = (0..n).filter(|&r| rows_match(y_pred, y_true, r)).count();
    Ok(matched as f32 / n as f32)
}
