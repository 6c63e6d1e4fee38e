//! Gaussian Noise Injection

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use sample_set::{PreprocessError, Result};
use serde::{Deserialize, Serialize};

/// Reproducible generator for noise draws
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Zero-mean i.i.d. Gaussian noise added to every seismogram sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Standard deviation of the noise
    pub scale: f64,
}

impl NoiseModel {
    /// Noise with the given standard deviation
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// No noise at all
    pub fn noiseless() -> Self {
        Self { scale: 0.0 }
    }

    /// Whether any noise is drawn
    pub fn is_noiseless(&self) -> bool {
        self.scale == 0.0
    }

    /// Check the scale is a finite non-negative number
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(PreprocessError::invalid(
                "noise scale",
                format!("{} must be finite and non-negative", self.scale),
            ));
        }
        Ok(())
    }

    fn distribution(&self) -> Result<Option<Normal<f64>>> {
        self.validate()?;
        if self.is_noiseless() {
            return Ok(None);
        }
        Normal::new(0.0, self.scale)
            .map(Some)
            .map_err(|e| PreprocessError::invalid("noise scale", e.to_string()))
    }

    /// Noisy copy of a single seismogram
    pub fn perturb<R: Rng + ?Sized>(&self, signal: ArrayView1<'_, f64>, rng: &mut R) -> Result<Array1<f64>> {
        Ok(match self.distribution()? {
            Some(normal) => signal.mapv(|v| v + normal.sample(&mut *rng)),
            None => signal.to_owned(),
        })
    }

    /// Noisy copy of every row, one independent draw per element (row-major)
    pub fn perturb_batch<R: Rng + ?Sized>(&self, signals: ArrayView2<'_, f64>, rng: &mut R) -> Result<Array2<f64>> {
        Ok(match self.distribution()? {
            Some(normal) => signals.mapv(|v| v + normal.sample(&mut *rng)),
            None => signals.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_noiseless_is_identity() {
        let signal = Array1::from(vec![1.0, -2.0, 3.0]);
        let mut rng = seeded_rng(1);
        let out = NoiseModel::noiseless().perturb(signal.view(), &mut rng).unwrap();
        assert_eq!(out, signal);
    }

    #[test]
    fn test_seed_reproducible() {
        let signals = Array2::<f64>::zeros((4, 8));
        let noise = NoiseModel::new(0.3);
        let a = noise.perturb_batch(signals.view(), &mut seeded_rng(42)).unwrap();
        let b = noise.perturb_batch(signals.view(), &mut seeded_rng(42)).unwrap();
        let c = noise.perturb_batch(signals.view(), &mut seeded_rng(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noise_scale_statistics() {
        let signals = Array2::<f64>::zeros((200, 100));
        let out = NoiseModel::new(2.0)
            .perturb_batch(signals.view(), &mut seeded_rng(7))
            .unwrap();
        let n = out.len() as f64;
        let mean = out.sum() / n;
        let std = (out.mapv(|v| (v - mean) * (v - mean)).sum() / n).sqrt();
        assert!(mean.abs() < 0.05);
        assert!((std - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_invalid_scale() {
        let signal = Array1::<f64>::zeros(4);
        let mut rng = seeded_rng(0);
        assert!(NoiseModel::new(-1.0).perturb(signal.view(), &mut rng).is_err());
        assert!(NoiseModel::new(f64::NAN).perturb(signal.view(), &mut rng).is_err());
    }
}
