//! Matrix type for 2D tabular data.

use serde::{Deserialize, Serialize};

/// A 2D matrix stored in row-major order.
///
/// Feature tables use `Matrix<f32>`, encoded target tables and multi-output
/// predictions use `Matrix<usize>`.
///
/// # Examples
///
/// ```
/// use homeauto::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, &'static str> {
        if data.len() != rows * cols {
            return Err("Data length must equal rows * cols");
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix from equally sized rows.
    ///
    /// An empty row list yields a `0 x cols` matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if a row's length differs from `cols`.
    pub fn from_rows(cols: usize, rows: &[Vec<T>]) -> Result<Self, &'static str> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err("All rows must have the same number of columns");
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Creates a matrix whose columns are the given equally long slices.
    ///
    /// # Errors
    ///
    /// Returns an error if the columns differ in length.
    pub fn from_columns(columns: &[&[T]]) -> Result<Self, &'static str> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, |c| c.len());
        if columns.iter().any(|c| c.len() != rows) {
            return Err("All columns must have the same length");
        }
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for column in columns {
                data.push(column[row]);
            }
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Returns a row as a slice.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns a column as an owned vector.
    #[must_use]
    pub fn column(&self, col_idx: usize) -> Vec<T> {
        (0..self.rows)
            .map(|row| self.data[row * self.cols + col_idx])
            .collect()
    }

    /// Returns a new matrix holding the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &idx in indices {
            data.extend_from_slice(self.row(idx));
        }
        Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_bad_length() {
        assert!(Matrix::from_vec(2, 2, vec![1.0f32, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(2, &[vec![1, 2], vec![3, 4], vec![5, 6]])
            .expect("rows are uniform");
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.get(2, 1), 6);
        assert!(Matrix::from_rows(2, &[vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn test_from_rows_empty() {
        let m: Matrix<usize> = Matrix::from_rows(4, &[]).expect("empty is fine");
        assert_eq!(m.shape(), (0, 4));
    }

    #[test]
    fn test_from_columns() {
        let a = [1usize, 2, 3];
        let b = [4usize, 5, 6];
        let m = Matrix::from_columns(&[&a, &b]).expect("columns are uniform");
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(0), &[1, 4]);
        assert_eq!(m.column(1), vec![4, 5, 6]);
    }

    #[test]
    fn test_select_rows_preserves_order() {
        let m = Matrix::from_vec(3, 2, vec![0, 1, 10, 11, 20, 21]).expect("valid");
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.shape(), (2, 2));
        assert_eq!(picked.row(0), &[20, 21]);
        assert_eq!(picked.row(1), &[0, 1]);
    }
}
