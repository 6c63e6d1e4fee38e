//! Seismogram Preprocessing
//!
//! Training-only normalization of receiver coordinates, seismograms and
//! power spectra:
//! - Coordinate centering, range feature and standardization
//! - Log, signed-log and standardization transforms
//! - Peak amplitude rescaling with optional time alignment

mod coordinates;
mod rescale;
mod spectrum;
mod statistics;

pub use coordinates::{
    CoordinateConfig, CoordinateFeatures, CoordinateFeaturizer, ReceiverPosition, SortedCoordinates,
    DEFAULT_RECEIVER,
};
pub use rescale::{shift_zero_fill, RescaleMode, RescaleRecord};
pub use spectrum::{Preprocessed, SpectrumPreprocessor, SpectrumTransform};
pub use statistics::{ColumnStats, ScalarStats};
