//! Error types for the homeauto CLI

use homeauto::HomeError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Not a file (e.g., directory)
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Malformed dataset or model file
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input outside the vocabulary or a bad argument
    #[error("{0}")]
    InvalidInput(String),

    /// Library error
    #[error("{0}")]
    Model(String),

    /// Model bundle could not be loaded
    #[error("Model load failed: {0}")]
    ModelLoadFailed(String),

    /// Server could not start or stopped with an error
    #[error("Server error: {0}")]
    Server(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) | Self::NotAFile(_) => ExitCode::from(3),
            Self::InvalidFormat(_) => ExitCode::from(4),
            Self::InvalidInput(_) => ExitCode::from(5),
            Self::ModelLoadFailed(_) => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
            Self::Server(_) => ExitCode::from(10),
            Self::Model(_) => ExitCode::from(1),
        }
    }
}

impl From<HomeError> for CliError {
    fn from(e: HomeError) -> Self {
        match e {
            HomeError::UnknownLabel { .. }
            | HomeError::InvalidInput(_)
            | HomeError::InvalidHyperparameter { .. } => Self::InvalidInput(e.to_string()),
            HomeError::Csv(_) | HomeError::Serialization(_) => Self::InvalidFormat(e.to_string()),
            HomeError::Io(io) => Self::Io(io),
            other => Self::Model(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let e = CliError::FileNotFound(PathBuf::from("data.csv"));
        assert_eq!(e.to_string(), "File not found: data.csv");
        let e = CliError::ModelLoadFailed("truncated".into());
        assert_eq!(e.to_string(), "Model load failed: truncated");
    }

    #[test]
    fn test_unknown_label_maps_to_invalid_input() {
        let e: CliError = HomeError::UnknownLabel {
            column: "mood".into(),
            label: "grumpy".into(),
        }
        .into();
        assert!(matches!(e, CliError::InvalidInput(_)));
        assert!(e.to_string().contains("grumpy"));
    }

    #[test]
    fn test_io_error_keeps_its_variant() {
        let e: CliError = HomeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into();
        assert!(matches!(e, CliError::Io(_)));
    }

    #[test]
    fn test_not_fitted_maps_to_model() {
        let e: CliError = HomeError::NotFitted("RandomForestClassifier").into();
        assert!(matches!(e, CliError::Model(_)));
    }
}
