//! Seismogram and Power Spectrum Transforms

use crate::rescale::{rescale, RescaleMode, RescaleRecord};
use crate::statistics::ScalarStats;
use ndarray::{s, Array2, ArrayView2};
use sample_set::{Result, SampleSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Transform applied to a whole sample set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpectrumTransform {
    /// Return the input unchanged
    #[default]
    Identity,
    /// Standardize with training mean and std
    Standardize,
    /// Decimal logarithm, for strictly positive power spectra
    Log { standardize: bool },
    /// `sign(x) * log10(1 + |x| ln 10)`, for raw seismograms
    SignedLog { standardize: bool },
    /// Peak amplitude rescale with peak time alignment
    Rescale { standardize: bool },
    /// Peak amplitude rescale without time alignment
    RescaleAmplitude { standardize: bool },
}

impl SpectrumTransform {
    /// Whether a training standardization step follows the transform
    pub fn standardizes(&self) -> bool {
        match *self {
            SpectrumTransform::Identity => false,
            SpectrumTransform::Standardize => true,
            SpectrumTransform::Log { standardize }
            | SpectrumTransform::SignedLog { standardize }
            | SpectrumTransform::Rescale { standardize }
            | SpectrumTransform::RescaleAmplitude { standardize } => standardize,
        }
    }

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectrumTransform::Identity => "identity",
            SpectrumTransform::Standardize => "standardize",
            SpectrumTransform::Log { .. } => "log",
            SpectrumTransform::SignedLog { .. } => "signed_log",
            SpectrumTransform::Rescale { .. } => "rescale",
            SpectrumTransform::RescaleAmplitude { .. } => "rescale_amplitude",
        }
    }
}

/// Output of a spectrum transform
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Transformed samples, same partition as the input
    pub data: SampleSet,
    /// Training statistics, when standardized
    pub stats: Option<ScalarStats>,
    /// Rescale factors, for the rescale modes
    pub rescale: Option<RescaleRecord>,
}

/// Applies a [`SpectrumTransform`] with training-only statistics
pub struct SpectrumPreprocessor {
    transform: SpectrumTransform,
}

impl SpectrumPreprocessor {
    /// Create a new preprocessor
    pub fn new(transform: SpectrumTransform) -> Self {
        Self { transform }
    }

    /// Get the configured transform
    pub fn transform(&self) -> SpectrumTransform {
        self.transform
    }

    /// Transform the whole sample set
    pub fn apply(&self, samples: &SampleSet) -> Result<Preprocessed> {
        let data = samples.data();
        debug!(
            "Applying {} to {}x{} samples",
            self.transform.as_str(),
            samples.len(),
            samples.sample_len()
        );

        let (values, record) = match self.transform {
            SpectrumTransform::Identity => {
                info!("No preprocessing step done");
                return Ok(Preprocessed {
                    data: samples.clone(),
                    stats: None,
                    rescale: None,
                });
            }
            SpectrumTransform::Standardize => (data.to_owned(), None),
            SpectrumTransform::Log { .. } => (data.mapv(f64::log10), None),
            SpectrumTransform::SignedLog { .. } => (signed_log(data), None),
            SpectrumTransform::Rescale { .. } => {
                let (values, record) = rescale(data, RescaleMode::Full)?;
                (values, Some(record))
            }
            SpectrumTransform::RescaleAmplitude { .. } => {
                let (values, record) = rescale(data, RescaleMode::AmplitudeOnly)?;
                (values, Some(record))
            }
        };

        let (values, stats) = if self.transform.standardizes() {
            let split = samples.partition().split;
            let stats = ScalarStats::compute(values.slice(s![..split, ..]))?;
            info!("Mean: {}, std dev: {}", stats.mean, stats.std_dev);
            (stats.apply(values.view()), Some(stats))
        } else {
            (values, None)
        };

        Ok(Preprocessed {
            data: samples.with_data(values)?,
            stats,
            rescale: record,
        })
    }
}

fn signed_log(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let ln10 = std::f64::consts::LN_10;
    data.mapv(|v| v.signum() * (1.0 + (v * ln10).abs()).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use sample_set::Partition;

    fn set(data: Array2<f64>, split: usize) -> SampleSet {
        SampleSet::new(data, Partition::new(split, 0)).unwrap()
    }

    #[test]
    fn test_identity() {
        let samples = set(array![[1.0, -2.0], [3.0, 4.0]], 1);
        let out = SpectrumPreprocessor::new(SpectrumTransform::Identity)
            .apply(&samples)
            .unwrap();
        assert_eq!(out.data, samples);
        assert!(out.stats.is_none() && out.rescale.is_none());
    }

    #[test]
    fn test_standardize_training_only() {
        let samples = set(array![[1.0, 3.0], [1.0, 3.0], [10.0, 20.0]], 2);
        let out = SpectrumPreprocessor::new(SpectrumTransform::Standardize)
            .apply(&samples)
            .unwrap();

        let stats = out.stats.unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std_dev, 1.0);
        assert_eq!(out.data.data().row(2).to_owned(), array![8.0, 18.0]);
    }

    #[test]
    fn test_log() {
        let samples = set(array![[1.0, 10.0, 1000.0]], 1);
        let out = SpectrumPreprocessor::new(SpectrumTransform::Log { standardize: false })
            .apply(&samples)
            .unwrap();
        let row = out.data.data().row(0).to_owned();
        for (a, b) in row.iter().zip([0.0, 1.0, 3.0]) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_log_then_standardize() {
        let samples = set(array![[1.0, 100.0], [1.0, 100.0], [1e4, 1e4]], 2);
        let out = SpectrumPreprocessor::new(SpectrumTransform::Log { standardize: true })
            .apply(&samples)
            .unwrap();
        let stats = out.stats.unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!((stats.std_dev - 1.0).abs() < 1e-12);
        assert!((out.data.data()[[2, 0]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_log_is_odd() {
        let samples = set(array![[-5.0, 0.0, 5.0]], 1);
        let out = SpectrumPreprocessor::new(SpectrumTransform::SignedLog { standardize: false })
            .apply(&samples)
            .unwrap();
        let row = out.data.data().row(0).to_owned();
        assert_eq!(row[1], 0.0);
        assert!((row[0] + row[2]).abs() < 1e-12);
        let expected = (1.0 + 5.0 * std::f64::consts::LN_10).log10();
        assert!((row[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rescale_reports_record() {
        let samples = set(array![[0.0, 2.0, 0.0], [1.0, 0.0, 0.0]], 2);
        let out = SpectrumPreprocessor::new(SpectrumTransform::Rescale { standardize: false })
            .apply(&samples)
            .unwrap();
        let record = out.rescale.unwrap();
        assert_eq!(record.amplitude_ratios, vec![1.0, 2.0]);
        assert_eq!(record.shift_indices, Some(vec![0, 1]));
        assert_eq!(out.data.data().row(1).to_owned(), array![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_transform_serde_tag() {
        let t: SpectrumTransform = serde_json::from_str(r#"{"mode":"log","standardize":true}"#).unwrap();
        assert_eq!(t, SpectrumTransform::Log { standardize: true });
        assert!(t.standardizes());
        assert!(!SpectrumTransform::RescaleAmplitude { standardize: false }.standardizes());
    }
}
