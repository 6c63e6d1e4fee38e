//! Log-Power Observable

use crate::fft::{FrequencyBand, PowerSpectrumAnalyzer};
use crate::noise::{seeded_rng, NoiseModel};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sample_set::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Observable configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservableConfig {
    /// rFFT bins compared during inference
    pub band: FrequencyBand,
    /// Noise added before the transform
    pub noise: NoiseModel,
    /// Seed for the noise generator (entropy-seeded when absent)
    pub seed: Option<u64>,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            band: FrequencyBand::new(1, 65),
            noise: NoiseModel::noiseless(),
            seed: None,
        }
    }
}

impl ObservableConfig {
    /// Generator seeded from `seed`, or from OS entropy when unset
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => seeded_rng(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Generator on its own stream of the same seed
    pub fn rng_stream(&self, stream: u64) -> ChaCha8Rng {
        let mut rng = self.rng();
        rng.set_stream(stream);
        rng
    }
}

/// Builds `log10(|rFFT(x + noise)|²)` restricted to a frequency band
pub struct ObservableBuilder {
    band: FrequencyBand,
    noise: NoiseModel,
    analyzer: PowerSpectrumAnalyzer,
}

impl ObservableBuilder {
    /// Create a new builder
    pub fn new(band: FrequencyBand, noise: NoiseModel) -> Result<Self> {
        noise.validate()?;
        // The upper bound depends on the signal length and is checked per call
        band.check_nonempty()?;
        Ok(Self {
            band,
            noise,
            analyzer: PowerSpectrumAnalyzer::new(),
        })
    }

    /// Create a builder from config
    pub fn from_config(config: &ObservableConfig) -> Result<Self> {
        Self::new(config.band, config.noise)
    }

    /// Get the band
    pub fn band(&self) -> FrequencyBand {
        self.band
    }

    /// Get the noise model
    pub fn noise(&self) -> NoiseModel {
        self.noise
    }

    /// Observable of a single seismogram
    pub fn build<R: Rng + ?Sized>(&mut self, seismogram: ArrayView1<'_, f64>, rng: &mut R) -> Result<Array1<f64>> {
        self.band.validate(seismogram.len())?;
        let noisy = self.noise.perturb(seismogram, rng)?;
        self.analyzer.band_log_power(noisy.view(), self.band)
    }

    /// Observables of every row, each with its own noise draw
    pub fn build_batch<R: Rng + ?Sized>(
        &mut self,
        seismograms: ArrayView2<'_, f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        self.band.validate(seismograms.ncols())?;
        let noisy = self.noise.perturb_batch(seismograms, rng)?;

        let mut out = Array2::zeros((noisy.nrows(), self.band.width()));
        for (i, row) in noisy.outer_iter().enumerate() {
            out.row_mut(i).assign(&self.analyzer.band_log_power(row, self.band)?);
        }
        debug!(
            "Built {} observables over bins [{}, {})",
            out.nrows(),
            self.band.start,
            self.band.cut
        );
        Ok(out)
    }
}
