//! Diagnostics Sinks

use crate::text::write_column;
use crate::{DiagnosticsError, AMPLITUDE_FILE, AMPLITUDE_UNSORTED_FILE, SHIFT_UNSORTED_FILE};
use seismo_preprocess::{RescaleMode, RescaleRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for rescale records
pub trait DiagnosticsSink {
    /// Persist one rescale record
    fn record_rescale(&mut self, record: &RescaleRecord) -> Result<(), DiagnosticsError>;
}

/// Writes rescale records as numeric text columns into a directory
pub struct TextFileSink {
    dir: PathBuf,
}

impl TextFileSink {
    /// Create a sink writing into `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DiagnosticsError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| DiagnosticsError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Writing rescale diagnostics to {}", dir.display());
        Ok(Self { dir })
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DiagnosticsSink for TextFileSink {
    fn record_rescale(&mut self, record: &RescaleRecord) -> Result<(), DiagnosticsError> {
        let ratios = record.amplitude_ratios.iter().copied();
        match record.mode {
            RescaleMode::AmplitudeOnly => {
                let n = write_column(&self.dir.join(AMPLITUDE_FILE), ratios)?;
                debug!("Wrote {} amplitude ratios", n);
            }
            RescaleMode::Full => {
                let n = write_column(&self.dir.join(AMPLITUDE_UNSORTED_FILE), ratios)?;
                let shifts = record.shift_indices.as_deref().unwrap_or_default();
                write_column(
                    &self.dir.join(SHIFT_UNSORTED_FILE),
                    shifts.iter().map(|&s| s as f64),
                )?;
                debug!("Wrote {} amplitude ratios and {} shift indices", n, shifts.len());
            }
        }
        Ok(())
    }
}

/// Keeps rescale records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<RescaleRecord>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far
    pub fn records(&self) -> &[RescaleRecord] {
        &self.records
    }
}

impl DiagnosticsSink for MemorySink {
    fn record_rescale(&mut self, record: &RescaleRecord) -> Result<(), DiagnosticsError> {
        self.records.push(record.clone());
        Ok(())
    }
}
