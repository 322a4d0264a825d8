//! Error types for the separation pipeline

use std::fmt;

/// Errors that can occur while decomposing audio
#[derive(Debug, Clone, PartialEq)]
pub enum SeparationError {
    /// Audio could not be opened, decoded, or contained no samples
    AudioLoad(String),

    /// A matrix dimension collapsed below what a processing step needs
    DegenerateInput(String),

    /// Shapes passed between pipeline stages do not agree (programmer error)
    InvariantViolation(String),

    /// NaN or infinite values appeared despite the epsilon floor
    NumericInstability(String),

    /// Invalid input parameters
    InvalidInput(String),

    /// The run was cancelled through a [`crate::cancel::CancelToken`]
    Cancelled,
}

impl fmt::Display for SeparationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeparationError::AudioLoad(msg) => write!(f, "Audio load error: {}", msg),
            SeparationError::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
            SeparationError::InvariantViolation(msg) => {
                write!(f, "Invariant violation: {}", msg)
            }
            SeparationError::NumericInstability(msg) => {
                write!(f, "Numeric instability: {}", msg)
            }
            SeparationError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            SeparationError::Cancelled => write!(f, "Processing was cancelled"),
        }
    }
}

impl std::error::Error for SeparationError {}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SeparationError>;
