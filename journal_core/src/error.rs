//! Error types for the journal_core library.

use crate::types::Exercise;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for journal_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted document does not match any known schema version
    #[error("Corrupt journal document: {0}")]
    Corrupt(String),

    /// The exercise is still referenced by at least one segment and cannot
    /// be deleted
    #[error("Exercise \"{}\" is used in segments", .0.name)]
    ExerciseUsedInSegments(Exercise),
}
