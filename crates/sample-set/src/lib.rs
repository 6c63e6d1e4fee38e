//! Sample Sets
//!
//! Provides the positional training/validation/testing partition shared by
//! every preprocessing stage, plus the common error type.

mod error;
mod set;

pub use error::PreprocessError;
pub use set::{Partition, SampleSet};

/// Result alias used across the preprocessing crates
pub type Result<T> = std::result::Result<T, PreprocessError>;
