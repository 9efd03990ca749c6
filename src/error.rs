//! Error types for the pcb-eval library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pcb-eval operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Error types that can occur while loading inputs or evaluating detections.
#[derive(Error, Debug)]
pub enum EvalError {
    /// An image, annotation or prediction file is absent on disk.
    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    /// Malformed annotation (missing element, unparsable number).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Annotation is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The detection source failed on a single image.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The detection source or ground-truth loader could not be set up.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Invalid bounding box coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Invalid IoU or confidence threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    /// Whether this error means the annotation itself is unusable, as
    /// opposed to missing.
    pub fn is_malformed_annotation(&self) -> bool {
        matches!(
            self,
            EvalError::Parse(_) | EvalError::Xml(_) | EvalError::InvalidBoundingBox(_)
        )
    }
}
