//! Receiver-Relative Coordinate Features

use crate::statistics::ColumnStats;
use ndarray::{s, Array2, ArrayView1};
use sample_set::{PreprocessError, Result, SampleSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Receiver used by the reference experiments
pub const DEFAULT_RECEIVER: [f64; 3] = [41.0, 41.0, 244.0];

/// Number of output columns: three offsets plus the range
pub const FEATURE_WIDTH: usize = 4;

/// Fixed 3-D reference point the source coordinates are centered on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiverPosition(pub [f64; 3]);

impl Default for ReceiverPosition {
    fn default() -> Self {
        Self(DEFAULT_RECEIVER)
    }
}

impl From<[f64; 3]> for ReceiverPosition {
    fn from(p: [f64; 3]) -> Self {
        Self(p)
    }
}

/// Coordinate featurization options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    /// Receiver position to center on
    pub receiver: ReceiverPosition,
    /// Standardize columns with training-only statistics
    pub standardize: bool,
    /// Sort training and testing rows by distance
    pub sort: bool,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            receiver: ReceiverPosition::default(),
            standardize: true,
            sort: false,
        }
    }
}

/// Featurized coordinates
#[derive(Debug, Clone)]
pub struct CoordinateFeatures {
    /// N×4 rows of (dx, dy, dz, range), same partition as the input
    pub data: SampleSet,
    /// Training statistics, when standardized
    pub stats: Option<ColumnStats>,
}

/// Featurized coordinates sorted by distance within training and testing
#[derive(Debug, Clone)]
pub struct SortedCoordinates {
    /// Sorted (and possibly standardized) features
    pub features: CoordinateFeatures,
    /// Permutation applied to the training rows
    pub training_order: Vec<usize>,
    /// Permutation applied to the testing rows, relative to the testing start
    pub testing_order: Vec<usize>,
}

impl SortedCoordinates {
    /// Apply the same row permutation to a parallel sample set
    pub fn reorder(&self, other: &SampleSet) -> Result<SampleSet> {
        let n = self.features.data.len();
        if other.len() != n {
            return Err(PreprocessError::shape(
                "parallel reorder",
                format!("{} samples", n),
                format!("{} samples", other.len()),
            ));
        }

        let partition = self.features.data.partition();
        let source = other.data();
        let mut out = source.to_owned();
        for (dst, &src) in self.training_order.iter().enumerate() {
            out.row_mut(dst).assign(&source.row(src));
        }
        let test_start = partition.testing(n).start;
        for (dst, &src) in self.testing_order.iter().enumerate() {
            out.row_mut(test_start + dst).assign(&source.row(test_start + src));
        }

        SampleSet::new(out, other.partition())
    }
}

/// Centers coordinates on a receiver and appends the source–receiver range
pub struct CoordinateFeaturizer {
    receiver: ReceiverPosition,
    standardize: bool,
}

impl CoordinateFeaturizer {
    /// Create a new featurizer
    pub fn new(receiver: impl Into<ReceiverPosition>, standardize: bool) -> Self {
        Self {
            receiver: receiver.into(),
            standardize,
        }
    }

    /// Create a featurizer from config (the `sort` flag selects the method to call)
    pub fn from_config(config: &CoordinateConfig) -> Self {
        Self::new(config.receiver, config.standardize)
    }

    /// Get the receiver position
    pub fn receiver(&self) -> ReceiverPosition {
        self.receiver
    }

    /// Shift, append range, and optionally standardize
    pub fn featurize(&self, coords: &SampleSet) -> Result<CoordinateFeatures> {
        let shifted = self.shift(coords)?;
        debug!("Featurized {} coordinates", shifted.nrows());
        self.finish(coords, shifted)
    }

    /// Like [`featurize`](Self::featurize), with training and testing rows sorted by range
    pub fn featurize_sorted(&self, coords: &SampleSet) -> Result<SortedCoordinates> {
        let mut shifted = self.shift(coords)?;
        let n = shifted.nrows();
        let partition = coords.partition();

        let training = partition.training();
        let testing = partition.testing(n);
        let training_order = argsort(shifted.slice(s![training.clone(), FEATURE_WIDTH - 1]));
        let testing_order = argsort(shifted.slice(s![testing.clone(), FEATURE_WIDTH - 1]));

        let unsorted = shifted.clone();
        for (dst, &src) in training_order.iter().enumerate() {
            shifted.row_mut(training.start + dst).assign(&unsorted.row(training.start + src));
        }
        for (dst, &src) in testing_order.iter().enumerate() {
            shifted.row_mut(testing.start + dst).assign(&unsorted.row(testing.start + src));
        }
        debug!(
            "Sorted {} training and {} testing coordinates by range",
            training_order.len(),
            testing_order.len()
        );

        Ok(SortedCoordinates {
            features: self.finish(coords, shifted)?,
            training_order,
            testing_order,
        })
    }

    fn shift(&self, coords: &SampleSet) -> Result<Array2<f64>> {
        if coords.sample_len() != 3 {
            return Err(PreprocessError::shape(
                "coordinates",
                "3 columns",
                format!("{} columns", coords.sample_len()),
            ));
        }

        let [rx, ry, rz] = self.receiver.0;
        let data = coords.data();
        let mut out = Array2::zeros((coords.len(), FEATURE_WIDTH));
        for (i, row) in data.outer_iter().enumerate() {
            let d = [row[0] - rx, row[1] - ry, row[2] - rz];
            let range = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
            for (j, v) in [d[0], d[1], d[2], range].into_iter().enumerate() {
                out[[i, j]] = v;
            }
        }
        Ok(out)
    }

    fn finish(&self, coords: &SampleSet, features: Array2<f64>) -> Result<CoordinateFeatures> {
        let (data, stats) = if self.standardize {
            let split = coords.partition().split;
            let stats = ColumnStats::compute(features.slice(s![..split, ..]))?;
            info!("Coordinate mean: {}, std dev: {}", stats.mean, stats.std_dev);
            (stats.apply(features.view())?, Some(stats))
        } else {
            (features, None)
        };

        Ok(CoordinateFeatures {
            data: coords.with_data(data)?,
            stats,
        })
    }
}

fn argsort(values: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    idx
}
