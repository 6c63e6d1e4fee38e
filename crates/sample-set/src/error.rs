//! Preprocessing Error Types

use thiserror::Error;

/// Errors raised by the preprocessing stages
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessError {
    /// Array dimensions inconsistent with the stated parameters
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        actual: String,
    },

    /// Parameter outside its valid range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Covariance inversion failed or is numerically unstable
    #[error("Singular covariance matrix: {0}")]
    SingularCovariance(String),
}

impl PreprocessError {
    /// Build a shape mismatch error
    pub fn shape(context: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        PreprocessError::ShapeMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build an invalid parameter error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PreprocessError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
