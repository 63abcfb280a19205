//! Error types for the nutrition target engine

use thiserror::Error;

/// Errors raised by the target pipeline.
///
/// Each variant asks something different of the client: `MissingInput`
/// means "finish your profile", `Validation` means "pick a different value",
/// and `NotFound` means the caller referenced an identity that doesn't exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NutritionError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A single input field is out of range
    #[error("Validation error: {message}")]
    InvalidField { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result alias used throughout the engine
pub type NutritionResult<T> = Result<T, NutritionError>;
