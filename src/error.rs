//! Error types for the coastwatch hazard models

use thiserror::Error;

/// Result type alias for coastwatch operations
pub type Result<T> = std::result::Result<T, HazardError>;

/// Main error type shared by all hazard pipelines
#[derive(Error, Debug)]
pub enum HazardError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Target column '{0}' not found in data")]
    TargetNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for HazardError {
    fn from(err: polars::error::PolarsError) -> Self {
        HazardError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for HazardError {
    fn from(err: serde_json::Error) -> Self {
        HazardError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HazardError {
    fn from(err: ndarray::ShapeError) -> Self {
        HazardError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HazardError::TargetNotFound("risk_level".to_string());
        assert_eq!(err.to_string(), "Target column 'risk_level' not found in data");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HazardError = io_err.into();
        assert!(matches!(err, HazardError::IoError(_)));
    }
}
