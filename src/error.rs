//! Error types for coursecast

use thiserror::Error;

/// Result type alias for coursecast operations
pub type Result<T> = std::result::Result<T, CoursecastError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CoursecastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Missing bundle artifact: {0}")]
    MissingArtifact(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for CoursecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        CoursecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CoursecastError {
    fn from(err: serde_json::Error) -> Self {
        CoursecastError::SerializationError(err.to_string())
    }
}
