//! Seismogram Preprocessing for Simulation-Based Inference
//!
//! Facade over the preprocessing crates:
//! - `sample-set`: positional partitions and the shared error type
//! - `seismo-preprocess`: coordinate features and spectrum transforms
//! - `pca-compressor`: PCA basis fit and projection
//! - `observable`: log-power observable and its noise covariance
//! - `diagnostics`: rescale factor persistence

mod config;
mod pipeline;

pub use crate::config::{ConfigError, PipelineConfig, ENV_PREFIX};
pub use crate::pipeline::{Pipeline, PipelineError, Prepared, COVARIANCE_STREAM, OBSERVABLE_STREAM};

pub use diagnostics::{DiagnosticsError, DiagnosticsSink, MemorySink, TextFileSink};
pub use observable::{
    seeded_rng, CovarianceBuilder, CovarianceConfig, CovarianceEstimate, FrequencyBand, NoiseModel,
    ObservableBuilder, ObservableConfig, PowerSpectrumAnalyzer,
};
pub use pca_compressor::{PcaBasis, PcaCompression, PcaCompressor, PcaConfig};
pub use sample_set::{Partition, PreprocessError, SampleSet};
pub use seismo_preprocess::{
    ColumnStats, CoordinateConfig, CoordinateFeatures, CoordinateFeaturizer, Preprocessed, ReceiverPosition,
    RescaleMode, RescaleRecord, ScalarStats, SortedCoordinates, SpectrumPreprocessor, SpectrumTransform,
    DEFAULT_RECEIVER,
};

use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize human-readable logging at INFO
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Initialize JSON logging at INFO, one object per line
pub fn init_json_logging() {
    let subscriber = FmtSubscriber::builder()
        .json()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Tracing subscriber already installed");
    }
}
