//! Ошибки модели задержек

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelayError {
    #[error("Target column '{0}' not found in data")]
    MissingTargetColumn(String),

    #[error("Insufficient data: {rows} rows with {classes} distinct classes, need at least 2 rows and 2 classes")]
    InsufficientData { rows: usize, classes: usize },

    #[error("Model not trained: call fit() before predict()")]
    ModelNotTrained,

    #[error("Feature shape mismatch: expected {expected} columns, got {got}")]
    FeatureShape { expected: usize, got: usize },

    #[error("Row count mismatch: {features} feature rows, {target} target rows")]
    ShapeMismatch { features: usize, target: usize },

    #[error("Invalid label {0}: target must be 0 or 1")]
    InvalidLabel(u8),

    #[error("Singular system while solving Newton step")]
    SingularSystem,

    #[error("Dataset error: {0}")]
    Dataset(String),
}

pub type Result<T> = std::result::Result<T, DelayError>;
