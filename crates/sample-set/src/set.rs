//! Positional Sample Partitioning

use crate::{PreprocessError, Result};
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Positional split of a sample set.
///
/// The first `split` samples are training, the next `test_valid` are
/// validation and everything after that is testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Partition {
    /// Number of training samples
    pub split: usize,
    /// Number of validation samples following the training block
    pub test_valid: usize,
}

impl Partition {
    /// Create a new partition
    pub fn new(split: usize, test_valid: usize) -> Self {
        Self { split, test_valid }
    }

    /// Check the partition fits inside `n` samples
    pub fn validate(&self, n: usize) -> Result<()> {
        let needed = self.split.checked_add(self.test_valid).ok_or_else(|| {
            PreprocessError::shape(
                "partition",
                format!("at most {} samples in total", usize::MAX),
                format!("split {} + validation {}", self.split, self.test_valid),
            )
        })?;
        if needed > n {
            return Err(PreprocessError::shape(
                "partition",
                format!("at least {} samples (split {} + validation {})", needed, self.split, self.test_valid),
                format!("{} samples", n),
            ));
        }
        Ok(())
    }

    /// Training rows
    pub fn training(&self) -> Range<usize> {
        0..self.split
    }

    /// Validation rows
    pub fn validation(&self) -> Range<usize> {
        self.split..self.split.saturating_add(self.test_valid)
    }

    /// Testing rows for a set of `n` samples
    pub fn testing(&self, n: usize) -> Range<usize> {
        self.split.saturating_add(self.test_valid).min(n)..n
    }
}

/// N samples of equal length with their positional partition
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    data: Array2<f64>,
    partition: Partition,
}

impl SampleSet {
    /// Wrap an N×D array, checking the partition fits
    pub fn new(data: Array2<f64>, partition: Partition) -> Result<Self> {
        partition.validate(data.nrows())?;
        Ok(Self { data, partition })
    }

    /// Build from row vectors, which must all have the same length
    pub fn from_rows(rows: &[Vec<f64>], partition: Partition) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PreprocessError::shape(
                    "sample row",
                    format!("length {}", width),
                    format!("length {} at sample {}", row.len(), i),
                ));
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| PreprocessError::shape("sample rows", "rectangular array", e.to_string()))?;
        Self::new(data, partition)
    }

    /// Replace the data while keeping the partition (row count must match)
    pub fn with_data(&self, data: Array2<f64>) -> Result<Self> {
        if data.nrows() != self.len() {
            return Err(PreprocessError::shape(
                "sample set",
                format!("{} samples", self.len()),
                format!("{} samples", data.nrows()),
            ));
        }
        Ok(Self {
            data,
            partition: self.partition,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Check if there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of each sample
    pub fn sample_len(&self) -> usize {
        self.data.ncols()
    }

    /// The partition
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// The full N×D array
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Consume the set and return the array
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// A single sample
    pub fn sample(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.len()).then(|| self.data.row(index))
    }

    /// Training rows `[0, split)`
    pub fn training(&self) -> ArrayView2<'_, f64> {
        let r = self.partition.training();
        self.data.slice(s![r.start..r.end, ..])
    }

    /// Validation rows `[split, split + test_valid)`
    pub fn validation(&self) -> ArrayView2<'_, f64> {
        let r = self.partition.validation();
        self.data.slice(s![r.start..r.end, ..])
    }

    /// Testing rows `[split + test_valid, N)`
    pub fn testing(&self) -> ArrayView2<'_, f64> {
        let r = self.partition.testing(self.len());
        self.data.slice(s![r.start..r.end, ..])
    }
}
