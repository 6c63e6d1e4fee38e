//! Training Pipeline Driver
//!
//! Wires the preprocessing stages together from one [`PipelineConfig`].

use crate::config::{ConfigError, PipelineConfig};
use diagnostics::{DiagnosticsError, DiagnosticsSink};
use ndarray::{Array1, Array2, ArrayView1};
use observable::{CovarianceBuilder, CovarianceEstimate, ObservableBuilder};
use pca_compressor::{PcaCompression, PcaCompressor};
use sample_set::{PreprocessError, SampleSet};
use seismo_preprocess::{CoordinateFeatures, CoordinateFeaturizer, Preprocessed, SpectrumPreprocessor};
use thiserror::Error;
use tracing::{debug, info};

/// Noise stream used by [`Pipeline::covariance`]
pub const COVARIANCE_STREAM: u64 = 0;
/// Noise stream used by [`Pipeline::observable`]
pub const OBSERVABLE_STREAM: u64 = 1;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),
}

/// Everything the training stages produce
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Featurized source coordinates
    pub coordinates: CoordinateFeatures,
    /// Transformed spectra, in the same row order as `coordinates`.
    ///
    /// The rescale record stays in original sample order.
    pub spectra: Preprocessed,
    /// PCA basis and projections of `spectra`, when configured
    pub compression: Option<PcaCompression>,
    /// Training and testing row permutations, when sorting by range
    pub order: Option<(Vec<usize>, Vec<usize>)>,
}

/// Preprocessing pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from a validated config
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the config
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Featurize coordinates, transform and compress the parallel spectra.
    ///
    /// The rescale record is handed to `sink` once every stage succeeded.
    pub fn prepare(
        &self,
        coordinates: Array2<f64>,
        spectra: Array2<f64>,
        sink: Option<&mut dyn DiagnosticsSink>,
    ) -> Result<Prepared, PipelineError> {
        let partition = self.config.partition;
        let coordinates = SampleSet::new(coordinates, partition)?;
        let spectra = SampleSet::new(spectra, partition)?;
        if coordinates.len() != spectra.len() {
            return Err(PreprocessError::shape(
                "spectra",
                format!("{} samples", coordinates.len()),
                format!("{} samples", spectra.len()),
            )
            .into());
        }
        info!(
            "Preparing {} samples ({} training, {} validation)",
            spectra.len(),
            partition.split,
            partition.test_valid
        );

        // Rescaling references original sample 0, so transform before sorting
        let mut preprocessed = SpectrumPreprocessor::new(self.config.spectrum).apply(&spectra)?;

        let featurizer = CoordinateFeaturizer::from_config(&self.config.coordinates);
        let (features, order) = if self.config.coordinates.sort {
            let sorted = featurizer.featurize_sorted(&coordinates)?;
            preprocessed.data = sorted.reorder(&preprocessed.data)?;
            (sorted.features, Some((sorted.training_order, sorted.testing_order)))
        } else {
            (featurizer.featurize(&coordinates)?, None)
        };

        let compression = match &self.config.pca {
            Some(pca) => {
                let compression = PcaCompressor::from_config(pca).compress(&preprocessed.data)?;
                debug!("Compressed spectra to {:?}", compression.projected.dim());
                Some(compression)
            }
            None => None,
        };

        if let (Some(record), Some(sink)) = (preprocessed.rescale.as_ref(), sink) {
            sink.record_rescale(record)?;
        }

        Ok(Prepared {
            coordinates: features,
            spectra: preprocessed,
            compression,
            order,
        })
    }

    /// Noisy observable of one seismogram, drawing from [`OBSERVABLE_STREAM`]
    pub fn observable(&self, seismogram: ArrayView1<'_, f64>) -> Result<Array1<f64>, PipelineError> {
        let observable = &self.config.observable;
        let mut builder = ObservableBuilder::from_config(observable)?;
        Ok(builder.build(seismogram, &mut observable.rng_stream(OBSERVABLE_STREAM))?)
    }

    /// Covariance of the observable over the training seismograms
    pub fn covariance(&self, seismograms: Array2<f64>) -> Result<CovarianceEstimate, PipelineError> {
        let seismograms = SampleSet::new(seismograms, self.config.partition)?;
        let observable = &self.config.observable;
        let mut builder = CovarianceBuilder::new(observable.band, observable.noise, &self.config.covariance)?;
        Ok(builder.estimate(seismograms.training(), &mut observable.rng_stream(COVARIANCE_STREAM))?)
    }
}
