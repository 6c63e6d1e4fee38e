//! Rescale Diagnostics
//!
//! Persists the per-sample amplitude ratios and shift indices produced by
//! the rescale transforms, one value per line in original sample order.

mod sink;
mod text;

pub use sink::{DiagnosticsSink, MemorySink, TextFileSink};
pub use text::{format_value, read_column, write_column};

use thiserror::Error;

/// File written for amplitude-only rescaling
pub const AMPLITUDE_FILE: &str = "amplitude_rescale.txt";
/// Amplitude file written for full rescaling
pub const AMPLITUDE_UNSORTED_FILE: &str = "amplitude_rescale_NOTsorted.txt";
/// Shift index file written for full rescaling
pub const SHIFT_UNSORTED_FILE: &str = "shift_index_NOTsorted.txt";

/// Diagnostics errors
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
    #[error("Parse error on {path} line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
}
