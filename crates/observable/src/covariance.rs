//! Noise Covariance of the Log-Power Observable

use crate::fft::FrequencyBand;
use crate::noise::NoiseModel;
use crate::observable::ObservableBuilder;
use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use sample_set::{PreprocessError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Iteration cap for the eigenvalue solver
const EIGEN_MAX_ITERATIONS: usize = 10_000;

/// Covariance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CovarianceConfig {
    /// Smallest accepted ratio of smallest to largest eigenvalue
    pub condition_threshold: f64,
}

impl Default for CovarianceConfig {
    fn default() -> Self {
        Self {
            condition_threshold: 1e-12,
        }
    }
}

/// Covariance matrix of the training observables and its inverse
#[derive(Debug, Clone)]
pub struct CovarianceEstimate {
    /// B×B unbiased sample covariance
    pub covariance: Array2<f64>,
    /// Inverse of `covariance`
    pub inverse: Array2<f64>,
    /// Smallest over largest eigenvalue
    pub reciprocal_condition: f64,
}

/// Estimates the covariance of the observable over a noisy training set
pub struct CovarianceBuilder {
    observables: ObservableBuilder,
    condition_threshold: f64,
}

impl CovarianceBuilder {
    /// Create a new builder
    pub fn new(band: FrequencyBand, noise: NoiseModel, config: &CovarianceConfig) -> Result<Self> {
        if !(config.condition_threshold >= 0.0 && config.condition_threshold < 1.0) {
            return Err(PreprocessError::invalid(
                "condition threshold",
                format!("{} must be in [0, 1)", config.condition_threshold),
            ));
        }
        Ok(Self {
            observables: ObservableBuilder::new(band, noise)?,
            condition_threshold: config.condition_threshold,
        })
    }

    /// Covariance and inverse of the training observables
    pub fn estimate<R: Rng + ?Sized>(&mut self, training: ArrayView2<'_, f64>, rng: &mut R) -> Result<CovarianceEstimate> {
        let band = self.observables.band();
        let (m, b) = (training.nrows(), band.width());
        if m <= b {
            return Err(PreprocessError::SingularCovariance(format!(
                "{} training samples cannot give a full-rank covariance over {} frequency bins",
                m, b
            )));
        }

        let log_power = self.observables.build_batch(training, rng)?;
        let covariance = sample_covariance(log_power.view());
        debug!("Covariance over {} samples and {} bins", m, b);

        let (inverse, reciprocal_condition) = checked_inverse(&covariance, self.condition_threshold)?;
        info!("Covariance reciprocal condition number: {:e}", reciprocal_condition);

        Ok(CovarianceEstimate {
            covariance,
            inverse,
            reciprocal_condition,
        })
    }

    /// Only the inverse covariance
    pub fn inverse<R: Rng + ?Sized>(&mut self, training: ArrayView2<'_, f64>, rng: &mut R) -> Result<Array2<f64>> {
        self.estimate(training, rng).map(|e| e.inverse)
    }
}

/// Unbiased covariance with samples as rows and features as columns
fn sample_covariance(x: ArrayView2<'_, f64>) -> Array2<f64> {
    let m = x.nrows();
    let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| ndarray::Array1::zeros(x.ncols()));
    let centered = &x - &mean;
    centered.t().dot(&centered) / (m as f64 - 1.0)
}

fn checked_inverse(covariance: &Array2<f64>, threshold: f64) -> Result<(Array2<f64>, f64)> {
    if covariance.iter().any(|v| !v.is_finite()) {
        return Err(PreprocessError::SingularCovariance(
            "covariance contains non-finite entries (zero power in the band?)".into(),
        ));
    }

    let n = covariance.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| covariance[[i, j]]);

    let eigen = SymmetricEigen::try_new(matrix.clone(), f64::EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| PreprocessError::SingularCovariance("eigenvalue solver did not converge".into()))?;
    let largest = eigen.eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let smallest = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    if largest <= 0.0 {
        return Err(PreprocessError::SingularCovariance(
            "covariance is zero; the observables do not vary across samples".into(),
        ));
    }

    let reciprocal_condition = smallest / largest;
    if reciprocal_condition < threshold {
        warn!(
            "Covariance eigenvalues span [{:e}, {:e}]",
            smallest, largest
        );
        return Err(PreprocessError::SingularCovariance(format!(
            "reciprocal condition number {:e} is below {:e}",
            reciprocal_condition, threshold
        )));
    }

    let inverse = Cholesky::new(matrix)
        .ok_or_else(|| PreprocessError::SingularCovariance("covariance is not positive definite".into()))?
        .inverse();

    Ok((
        Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]),
        reciprocal_condition,
    ))
}
