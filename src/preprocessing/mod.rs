//! Preprocessing transformers for categorical data.
//!
//! [`LabelEncoder`] maps string categories to dense integer indices, and
//! [`FeatureEncoder`] combines one encoder per categorical context column
//! into the numeric feature rows the forests train on.
//!
//! # Example
//!
//! ```
//! use homeauto::preprocessing::LabelEncoder;
//!
//! let mut encoder = LabelEncoder::new("music_type");
//! let codes = encoder.fit_transform(&["rock", "jazz", "rock", "pop"]).expect("non-empty");
//!
//! // Classes are indexed in sorted order
//! assert_eq!(encoder.classes(), &["jazz", "pop", "rock"]);
//! assert_eq!(codes, vec![2, 0, 2, 1]);
//! assert_eq!(encoder.decode_one(1).expect("known index"), "pop");
//! ```

mod features;

pub use features::{DecodedFeatures, FeatureEncoder};

use crate::error::{HomeError, Result};
use serde::{Deserialize, Serialize};

/// Encodes string labels as integers in `0..n_classes`.
///
/// Classes are the distinct fitted values in sorted order, so fitting the
/// same values in any order yields the same mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Creates an unfitted encoder for the named column.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            classes: Vec::new(),
        }
    }

    /// Column this encoder was created for (used in error messages).
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Learns the distinct values of `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty.
    pub fn fit<S: AsRef<str>>(&mut self, values: &[S]) -> Result<()> {
        if values.is_empty() {
            return Err(HomeError::EmptyData(format!(
                "cannot fit label encoder '{}' on zero values",
                self.column
            )));
        }
        let mut classes: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    /// Encodes each value.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder is unfitted or a value wasn't seen in fit.
    pub fn transform<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<usize>> {
        values.iter().map(|v| self.encode_one(v.as_ref())).collect()
    }

    /// Fits on `values` then encodes them.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty.
    pub fn fit_transform<S: AsRef<str>>(&mut self, values: &[S]) -> Result<Vec<usize>> {
        self.fit(values)?;
        self.transform(values)
    }

    /// Decodes each index back to its label.
    ///
    /// # Errors
    ///
    /// Returns an error if an index was never produced by this encoder.
    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<&str>> {
        codes.iter().map(|&c| self.decode_one(c)).collect()
    }

    /// Encodes a single value.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFitted`] before fit, and
    /// [`HomeError::UnknownLabel`] for unseen values.
    pub fn encode_one(&self, value: &str) -> Result<usize> {
        if self.classes.is_empty() {
            return Err(HomeError::NotFitted("LabelEncoder"));
        }
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| HomeError::UnknownLabel {
                column: self.column.clone(),
                label: value.to_string(),
            })
    }

    /// Decodes a single index.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::UnknownLabel`] if `code >= n_classes()`.
    pub fn decode_one(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| HomeError::UnknownLabel {
                column: self.column.clone(),
                label: format!("index {code}"),
            })
    }

    /// Fitted classes in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of fitted classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Whether `fit` has been called.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_and_dedups() {
        let mut enc = LabelEncoder::new("mood");
        enc.fit(&["tired", "happy", "calm", "happy"]).expect("fit");
        assert_eq!(enc.classes(), &["calm", "happy", "tired"]);
        assert_eq!(enc.n_classes(), 3);
        assert!(enc.is_fitted());
    }

    #[test]
    fn test_fit_transform_codes() {
        let mut enc = LabelEncoder::new("time_of_day");
        let codes = enc
            .fit_transform(&["night", "morning", "evening", "morning"])
            .expect("fit");
        assert_eq!(codes, vec![2, 1, 0, 1]);
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let values = ["out", "sleeping", "awake", "out", "at_work"];
        let mut enc = LabelEncoder::new("person_condition");
        let codes = enc.fit_transform(&values).expect("fit");
        let decoded = enc.inverse_transform(&codes).expect("known codes");
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_unknown_value_is_error() {
        let mut enc = LabelEncoder::new("mood");
        enc.fit(&["happy"]).expect("fit");
        let err = enc.encode_one("grumpy").unwrap_err();
        assert!(matches!(err, HomeError::UnknownLabel { .. }));
    }

    #[test]
    fn test_unknown_index_is_error() {
        let mut enc = LabelEncoder::new("mood");
        enc.fit(&["happy", "calm"]).expect("fit");
        assert!(enc.decode_one(2).is_err());
        assert!(enc.inverse_transform(&[0, 7]).is_err());
    }

    #[test]
    fn test_unfitted_encoder() {
        let enc = LabelEncoder::new("mood");
        assert!(matches!(
            enc.encode_one("happy"),
            Err(HomeError::NotFitted(_))
        ));
        assert!(!enc.is_fitted());
    }

    #[test]
    fn test_fit_empty_is_error() {
        let mut enc = LabelEncoder::new("mood");
        let empty: [&str; 0] = [];
        assert!(matches!(enc.fit(&empty), Err(HomeError::EmptyData(_))));
    }

    #[test]
    fn test_fit_order_independent() {
        let mut a = LabelEncoder::new("x");
        let mut b = LabelEncoder::new("x");
        a.fit(&["c", "a", "b"]).expect("fit");
        b.fit(&["b", "c", "a"]).expect("fit");
        assert_eq!(a, b);
    }
}
