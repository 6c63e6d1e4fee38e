//! Fitted PCA Basis

use ndarray::{Array1, Array2, ArrayView2};
use sample_set::{PreprocessError, Result};
use seismo_preprocess::ColumnStats;
use serde::{Deserialize, Serialize};

/// Principal component basis fitted on training spectra.
///
/// Spectra are standardized per frequency bin with the training mean and
/// standard deviation, centered, and projected onto `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaBasis {
    /// k×D orthonormal rows, descending explained variance
    pub components: Array2<f64>,
    /// Per-bin training statistics
    pub stats: ColumnStats,
    /// Mean of the standardized training spectra (zero up to rounding)
    pub center: Array1<f64>,
    /// Variance captured by each component
    pub explained_variance: Array1<f64>,
    /// Total variance of the standardized training spectra
    pub total_variance: f64,
}

impl PcaBasis {
    /// Number of retained components
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Spectrum length
    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    /// Training mean per frequency bin
    pub fn mean(&self) -> &Array1<f64> {
        &self.stats.mean
    }

    /// Training standard deviation per frequency bin
    pub fn std_dev(&self) -> &Array1<f64> {
        &self.stats.std_dev
    }

    /// Fraction of the total variance captured by each component
    pub fn explained_variance_ratio(&self) -> Array1<f64> {
        if self.total_variance > 0.0 {
            &self.explained_variance / self.total_variance
        } else {
            Array1::zeros(self.n_components())
        }
    }

    /// Standardize spectra with the training statistics
    pub fn standardize(&self, spectra: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.stats.apply(spectra)
    }

    /// Project N×D spectra to N×k coordinates
    pub fn transform(&self, spectra: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let centered = self.standardize(spectra)? - &self.center;
        Ok(centered.dot(&self.components.t()))
    }

    /// Map N×k coordinates back to standardized spectra
    pub fn inverse_transform(&self, projected: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if projected.ncols() != self.n_components() {
            return Err(PreprocessError::shape(
                "pca inverse transform",
                format!("{} components", self.n_components()),
                format!("{} components", projected.ncols()),
            ));
        }
        Ok(projected.dot(&self.components) + &self.center)
    }

    /// Map N×k coordinates back to spectra in original units
    pub fn reconstruct(&self, projected: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let standardized = self.inverse_transform(projected)?;
        self.stats.invert(standardized.view())
    }
}
