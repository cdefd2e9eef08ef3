//! Multi-output classification: one forest per target column.

use super::{ForestConfig, RandomForestClassifier};
use crate::error::{HomeError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Fits an independent [`RandomForestClassifier`] for every column of a
/// target table and predicts whole target rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    estimators: Vec<RandomForestClassifier>,
    config: ForestConfig,
}

impl MultiOutputClassifier {
    /// Creates an unfitted multi-output classifier.
    #[must_use]
    pub fn new(config: ForestConfig) -> Self {
        Self {
            estimators: Vec::new(),
            config,
        }
    }

    /// Number of target columns, zero before fit.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.estimators.len()
    }

    /// Fits one forest per column of `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if `y` has no columns, its row count differs from
    /// `x`, or any forest fails to fit.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &Matrix<usize>) -> Result<()> {
        if y.n_cols() == 0 {
            return Err(HomeError::EmptyData(
                "multi-output target table has no columns".to_string(),
            ));
        }
        if x.n_rows() != y.n_rows() {
            return Err(HomeError::DimensionMismatch {
                expected: format!("{} target rows", x.n_rows()),
                actual: format!("{} target rows", y.n_rows()),
            });
        }

        self.estimators = (0..y.n_cols())
            .map(|col| {
                let mut forest = RandomForestClassifier::new(self.config.clone());
                forest.fit(x, &y.column(col))?;
                Ok(forest)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// Predicts a `(n_samples, n_outputs)` table.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted or rows have the wrong width.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Matrix<usize>> {
        let rows = (0..x.n_rows())
            .map(|r| self.predict_row(x.row(r)))
            .collect::<Result<Vec<_>>>()?;
        Matrix::from_rows(self.n_outputs(), &rows).map_err(HomeError::from)
    }

    /// Predicts every output for one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if unfitted or the row has the wrong width.
    pub fn predict_row(&self, sample: &[f32]) -> Result<Vec<usize>> {
        if self.estimators.is_empty() {
            return Err(HomeError::NotFitted("MultiOutputClassifier"));
        }
        self.estimators
            .iter()
            .map(|forest| forest.predict_row(sample))
            .collect()
    }
}
