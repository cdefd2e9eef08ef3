//! Train/test splitting.
//!
//! One shuffle is drawn and then applied to every table of a dataset, so the
//! feature matrix and all target tables hold out exactly the same rows.
//!
//! # Example
//!
//! ```
//! use homeauto::model_selection::split_indices;
//!
//! let split = split_indices(10, 0.2, Some(42)).expect("valid split");
//! assert_eq!(split.n_train(), 8);
//! assert_eq!(split.n_test(), 2);
//! ```

use crate::error::{HomeError, Result};
use crate::primitives::Matrix;

/// Row indices of one train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl SplitIndices {
    /// Training row indices, in shuffled order.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Held-out row indices, in shuffled order.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    /// Number of training rows.
    #[must_use]
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    /// Number of held-out rows.
    #[must_use]
    pub fn n_test(&self) -> usize {
        self.test.len()
    }

    /// Splits a row-major table into `(train, test)`.
    #[must_use]
    pub fn split_matrix<T: Copy>(&self, table: &Matrix<T>) -> (Matrix<T>, Matrix<T>) {
        (table.select_rows(&self.train), table.select_rows(&self.test))
    }

    /// Splits a single column into `(train, test)`.
    #[must_use]
    pub fn split_slice<T: Clone>(&self, values: &[T]) -> (Vec<T>, Vec<T>) {
        (take_rows(values, &self.train), take_rows(values, &self.test))
    }
}

/// Validates inputs for `split_indices`.
fn validate_split_inputs(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HomeError::InvalidHyperparameter {
            param: "test_size".to_string(),
            value: test_size.to_string(),
            constraint: "a fraction strictly between 0 and 1".to_string(),
        });
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(HomeError::EmptyData(format!(
            "split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Shuffles indices with optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Draws a shuffled partition of `0..n_samples`.
///
/// `n_test = ceil(n_samples * test_size)` and the rest train. The same
/// `random_state` always yields the same partition.
///
/// # Errors
///
/// Returns an error if `test_size` is outside `(0, 1)` or either side of the
/// split would be empty.
pub fn split_indices(
    n_samples: usize,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<SplitIndices> {
    let (_, n_test) = validate_split_inputs(n_samples, test_size)?;
    let indices = shuffle_indices(n_samples, random_state);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    tracing::debug!(n_train = train.len(), n_test, "drew train/test split");
    Ok(SplitIndices { train, test })
}

/// Gathers `values[i]` for each `i` in `indices`.
///
/// # Panics
///
/// Panics if an index is out of bounds.
#[must_use]
pub fn take_rows<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let split = split_indices(10, 0.2, Some(42)).expect("valid");
        assert_eq!(split.n_train(), 8);
        assert_eq!(split.n_test(), 2);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let split = split_indices(11, 0.2, Some(0)).expect("valid");
        assert_eq!(split.n_test(), 3);
        assert_eq!(split.n_train(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = split_indices(57, 0.2, Some(7)).expect("valid");
        let train: HashSet<_> = split.train().iter().copied().collect();
        let test: HashSet<_> = split.test().iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 57);
        assert!(train.union(&test).all(|&i| i < 57));
    }

    #[test]
    fn test_split_reproducibility() {
        let a = split_indices(50, 0.2, Some(42)).expect("valid");
        let b = split_indices(50, 0.2, Some(42)).expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_different_seeds() {
        let a = split_indices(50, 0.2, Some(42)).expect("valid");
        let b = split_indices(50, 0.2, Some(123)).expect("valid");
        assert_ne!(a.test(), b.test());
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(split_indices(10, 0.0, Some(1)).is_err());
        assert!(split_indices(10, 1.0, Some(1)).is_err());
        assert!(split_indices(10, f64::NAN, Some(1)).is_err());
    }

    #[test]
    fn test_too_few_samples() {
        assert!(matches!(
            split_indices(1, 0.2, Some(1)),
            Err(HomeError::EmptyData(_))
        ));
        assert!(split_indices(0, 0.2, Some(1)).is_err());
    }

    #[test]
    fn test_aligned_tables() {
        // Column 0 of every table carries the original row id.
        let n = 20;
        let x = Matrix::from_vec(n, 2, (0..n).flat_map(|i| [i as f32, 0.0]).collect())
            .expect("valid");
        let y = Matrix::from_vec(n, 3, (0..n).flat_map(|i| [i, 1, 2]).collect()).expect("valid");
        let music: Vec<usize> = (0..n).collect();

        let split = split_indices(n, 0.2, Some(42)).expect("valid");
        let (x_train, x_test) = split.split_matrix(&x);
        let (y_train, y_test) = split.split_matrix(&y);
        let (m_train, m_test) = split.split_slice(&music);

        for i in 0..split.n_test() {
            assert_eq!(x_test.get(i, 0) as usize, y_test.get(i, 0));
            assert_eq!(y_test.get(i, 0), m_test[i]);
        }
        for i in 0..split.n_train() {
            assert_eq!(x_train.get(i, 0) as usize, y_train.get(i, 0));
            assert_eq!(y_train.get(i, 0), m_train[i]);
        }
    }
}
