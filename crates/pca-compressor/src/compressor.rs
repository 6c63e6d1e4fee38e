//! PCA Fitting

use crate::basis::PcaBasis;
use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2, Axis};
use sample_set::{PreprocessError, Result, SampleSet};
use seismo_preprocess::ColumnStats;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Iteration cap for the SVD
const SVD_MAX_ITERATIONS: usize = 10_000;

/// PCA configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaConfig {
    /// Number of components to keep
    pub components: usize,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self { components: 10 }
    }
}

/// A fitted basis together with every sample's projection
#[derive(Debug, Clone)]
pub struct PcaCompression {
    /// Fitted basis
    pub basis: PcaBasis,
    /// N×k projection of the full sample set
    pub projected: Array2<f64>,
}

/// Fits a PCA basis on the training partition
pub struct PcaCompressor {
    components: usize,
}

impl PcaCompressor {
    /// Create a compressor keeping `components` directions
    pub fn new(components: usize) -> Self {
        Self { components }
    }

    /// Create a compressor from config
    pub fn from_config(config: &PcaConfig) -> Self {
        Self::new(config.components)
    }

    /// Fit on the training spectra and project the full set
    pub fn compress(&self, spectra: &SampleSet) -> Result<PcaCompression> {
        let basis = self.fit(spectra)?;
        let projected = basis.transform(spectra.data())?;
        Ok(PcaCompression { basis, projected })
    }

    /// Fit the basis on the training spectra only
    pub fn fit(&self, spectra: &SampleSet) -> Result<PcaBasis> {
        let training = spectra.training();
        let (n, d) = training.dim();
        let k = self.components;
        if k == 0 || k > n.min(d) {
            return Err(PreprocessError::invalid(
                "components",
                format!("{} must be in 1..={} (training samples {}, spectrum length {})", k, n.min(d), n, d),
            ));
        }

        let stats = ColumnStats::compute(training)?;
        if let Some(bin) = stats.std_dev.iter().position(|&s| !(s > 0.0)) {
            return Err(PreprocessError::invalid(
                "spectra",
                format!("frequency bin {} is constant over the training samples", bin),
            ));
        }
        let standardized = stats.apply(training)?;
        let center = standardized
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(d));
        let centered = &standardized - &center;
        debug!("Fitting PCA on {}x{} standardized training spectra", n, d);

        let matrix = DMatrix::from_fn(n, d, |i, j| centered[[i, j]]);
        let svd = SVD::try_new(matrix, false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(|| PreprocessError::invalid("spectra", "SVD did not converge"))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| PreprocessError::invalid("spectra", "SVD produced no right singular vectors"))?;

        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

        let dof = n.saturating_sub(1).max(1) as f64;
        let total_variance = svd.singular_values.iter().map(|s| s * s).sum::<f64>() / dof;

        let mut components = Array2::zeros((k, d));
        let mut explained_variance = Array1::zeros(k);
        for (row, &idx) in order.iter().take(k).enumerate() {
            let direction: Vec<f64> = v_t.row(idx).iter().copied().collect();
            let sign = sign_of_largest(&direction);
            for (j, v) in direction.into_iter().enumerate() {
                components[[row, j]] = sign * v;
            }
            let s = svd.singular_values[idx];
            explained_variance[row] = s * s / dof;
        }

        let basis = PcaBasis {
            components,
            stats,
            center,
            explained_variance,
            total_variance,
        };
        let ratio = basis.explained_variance_ratio();
        info!("Explained variance ratio: {}", ratio);
        if ratio.sum() < 0.5 {
            warn!("{} components capture only {:.1}% of the variance", k, ratio.sum() * 100.0);
        }

        Ok(basis)
    }
}

/// Sign making the largest-magnitude loading positive
fn sign_of_largest(direction: &[f64]) -> f64 {
    let largest = direction
        .iter()
        .copied()
        .fold(0.0f64, |best, v| if v.abs() > best.abs() { v } else { best });
    if largest < 0.0 {
        -1.0
    } else {
        1.0
    }
}
