//! Error types for GymCoach

use thiserror::Error;

/// Core GymCoach errors
///
/// Absent poses, undefined angles and low-confidence predictions are normal
/// outcomes and never surface here.
#[derive(Error, Debug)]
pub enum CoachError {
    // Pose errors
    #[error("Invalid landmark count: expected {expected}, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    // Classifier errors
    #[error("Model does not produce per-class probabilities")]
    ProbabilitiesUnsupported,

    #[error("Model exposes no classes")]
    EmptyClassSet,

    #[error("Probability shape mismatch: expected {expected} classes, got {actual}")]
    ProbabilityShape { expected: usize, actual: usize },

    #[error("Feature shape mismatch: expected {expected} columns, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    // Training errors
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("A retraining job is already in flight")]
    RetrainInFlight,

    // Output errors
    #[error("Speech failed: {0}")]
    Speech(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for GymCoach operations
pub type CoachResult<T> = Result<T, CoachError>;
