//! Pipeline configuration

use config::{Config, Environment, File, FileFormat};
use observable::{CovarianceConfig, ObservableConfig};
use pca_compressor::PcaConfig;
use sample_set::{Partition, PreprocessError};
use seismo_preprocess::{CoordinateConfig, SpectrumTransform};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Prefix of environment overrides, e.g. `SBI_PREP__PCA__COMPONENTS=8`
pub const ENV_PREFIX: &str = "SBI_PREP";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid config: {0}")]
    Invalid(#[from] PreprocessError),
}

/// Full preprocessing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Training / validation / testing split
    pub partition: Partition,
    /// Coordinate featurization
    pub coordinates: CoordinateConfig,
    /// Spectrum or seismogram transform
    pub spectrum: SpectrumTransform,
    /// PCA compression, skipped when absent
    pub pca: Option<PcaConfig>,
    /// Observable band, noise and seed
    pub observable: ObservableConfig,
    /// Covariance inversion
    pub covariance: CovarianceConfig,
}

impl PipelineConfig {
    /// Log power spectra, standardized
    pub fn power_spectra() -> Self {
        Self {
            spectrum: SpectrumTransform::Log { standardize: true },
            pca: Some(PcaConfig::default()),
            ..Default::default()
        }
    }

    /// Raw seismograms through the signed log, standardized
    pub fn raw_seismograms() -> Self {
        Self {
            spectrum: SpectrumTransform::SignedLog { standardize: true },
            ..Default::default()
        }
    }

    /// Peak-aligned seismograms sorted by source range
    pub fn aligned_seismograms() -> Self {
        Self {
            coordinates: CoordinateConfig {
                sort: true,
                ..Default::default()
            },
            spectrum: SpectrumTransform::Rescale { standardize: true },
            ..Default::default()
        }
    }

    /// Load a config file (format from its extension) with environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading pipeline config from {}", path.display());
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;
        Self::finish(config)
    }

    /// Load a TOML document with environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(environment())
            .build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check values that do not depend on the data
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinates.receiver.0.iter().any(|v| !v.is_finite()) {
            return Err(PreprocessError::invalid("coordinates.receiver", "must be finite").into());
        }

        if let Some(pca) = &self.pca {
            if pca.components == 0 {
                return Err(PreprocessError::invalid("pca.components", "must be at least 1").into());
            }
            if self.partition.split > 0 && pca.components > self.partition.split {
                return Err(PreprocessError::invalid(
                    "pca.components",
                    format!("{} exceeds the {} training samples", pca.components, self.partition.split),
                )
                .into());
            }
        }

        self.observable.band.check_nonempty()?;
        self.observable.noise.validate()?;

        let threshold = self.covariance.condition_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(PreprocessError::invalid(
                "covariance.condition_threshold",
                format!("{} must be in [0, 1)", threshold),
            )
            .into());
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable::{FrequencyBand, NoiseModel};

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.spectrum, SpectrumTransform::Identity);
        assert_eq!(config.coordinates.receiver.0, [41.0, 41.0, 244.0]);
        assert!(config.pca.is_none());
        assert_eq!(config.observable.band, FrequencyBand::new(1, 65));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let spectra = PipelineConfig::power_spectra();
        assert!(spectra.spectrum.standardizes());
        assert_eq!(spectra.pca.map(|p| p.components), Some(10));

        let raw = PipelineConfig::raw_seismograms();
        assert_eq!(raw.spectrum, SpectrumTransform::SignedLog { standardize: true });
        assert!(raw.pca.is_none());

        let aligned = PipelineConfig::aligned_seismograms();
        assert!(aligned.coordinates.sort);
        assert!(aligned.coordinates.standardize);
        assert!(aligned.pca.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [partition]
            split = 80
            test_valid = 10

            [spectrum]
            mode = "log"
            standardize = true

            [pca]
            components = 6

            [observable]
            band = { start = 2, cut = 40 }
            noise = { scale = 0.05 }
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.partition, Partition::new(80, 10));
        assert_eq!(config.spectrum, SpectrumTransform::Log { standardize: true });
        assert_eq!(config.pca.map(|p| p.components), Some(6));
        assert_eq!(config.observable.band, FrequencyBand::new(2, 40));
        assert_eq!(config.observable.noise, NoiseModel::new(0.05));
        assert_eq!(config.observable.seed, Some(7));
        assert!(config.coordinates.standardize);
        assert_eq!(config.covariance.condition_threshold, 1e-12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let too_many = PipelineConfig {
            partition: Partition::new(4, 0),
            pca: Some(PcaConfig::default()),
            ..Default::default()
        };
        assert!(matches!(too_many.validate(), Err(ConfigError::Invalid(_))));

        let mut negative_noise = PipelineConfig::default();
        negative_noise.observable.noise = NoiseModel::new(-1.0);
        assert!(negative_noise.validate().is_err());

        let mut empty_band = PipelineConfig::default();
        empty_band.observable.band = FrequencyBand::new(5, 5);
        assert!(empty_band.validate().is_err());

        let mut threshold = PipelineConfig::default();
        threshold.covariance.condition_threshold = 1.0;
        assert!(threshold.validate().is_err());
    }

    #[test]
    fn test_bad_toml() {
        let err = PipelineConfig::from_toml_str("[pca]\ncomponents = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::aligned_seismograms();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.spectrum, config.spectrum);
        assert_eq!(back.coordinates.sort, config.coordinates.sort);
        assert!(back.pca.is_none());
    }
}
