//! Error types for homeauto operations.
//!
//! Provides rich error context for library consumers.

use thiserror::Error;

/// Main error type for homeauto operations.
///
/// # Examples
///
/// ```
/// use homeauto::error::HomeError;
///
/// let err = HomeError::DimensionMismatch {
///     expected: "100x5".to_string(),
///     actual: "100x4".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum HomeError {
    /// Matrix/label dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An operation that needs at least one sample was given none.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A label was never seen by the encoder, or an index was never produced by it.
    #[error("Unknown label for '{column}': {label}")]
    UnknownLabel {
        /// Column or encoder name
        column: String,
        /// The offending value (category text or index)
        label: String,
    },

    /// User-supplied input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model used before `fit`.
    #[error("Model not fitted: {0}")]
    NotFitted(&'static str),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with string message.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for HomeError {
    fn from(msg: &str) -> Self {
        HomeError::Other(msg.to_string())
    }
}

impl From<String> for HomeError {
    fn from(msg: String) -> Self {
        HomeError::Other(msg)
    }
}

impl From<bincode::Error> for HomeError {
    fn from(err: bincode::Error) -> Self {
        HomeError::Serialization(err.to_string())
    }
}

/// Result type alias for homeauto operations.
pub type Result<T> = std::result::Result<T, HomeError>;
