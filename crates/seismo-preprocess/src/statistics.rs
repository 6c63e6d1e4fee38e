//! Training-Partition Statistics

use ndarray::{Array1, Array2, ArrayView2, Axis};
use sample_set::{PreprocessError, Result};
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation over every element of a block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarStats {
    /// Mean value
    pub mean: f64,
    /// Standard deviation (population, ddof = 0)
    pub std_dev: f64,
}

impl ScalarStats {
    /// Compute statistics over all elements of `values`
    pub fn compute(values: ArrayView2<'_, f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PreprocessError::invalid(
                "split",
                "standardization needs at least one training sample",
            ));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let m2: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();

        Ok(Self {
            mean,
            std_dev: (m2 / n).sqrt(),
        })
    }

    /// Standardize `data` with these statistics
    pub fn apply(&self, data: ArrayView2<'_, f64>) -> Array2<f64> {
        data.mapv(|v| (v - self.mean) / self.std_dev)
    }
}

/// Per-column mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Column means
    pub mean: Array1<f64>,
    /// Column standard deviations (population, ddof = 0)
    pub std_dev: Array1<f64>,
}

impl ColumnStats {
    /// Compute column statistics over the rows of `values`
    pub fn compute(values: ArrayView2<'_, f64>) -> Result<Self> {
        let (mean, std_dev) = match (values.mean_axis(Axis(0)), values.nrows()) {
            (Some(mean), n) if n > 0 => (mean, values.std_axis(Axis(0), 0.0)),
            _ => {
                return Err(PreprocessError::invalid(
                    "split",
                    "standardization needs at least one training sample",
                ))
            }
        };
        Ok(Self { mean, std_dev })
    }

    /// Number of columns covered
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardize each column of `data`
    pub fn apply(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.width() {
            return Err(PreprocessError::shape(
                "column standardization",
                format!("{} columns", self.width()),
                format!("{} columns", data.ncols()),
            ));
        }
        Ok((&data - &self.mean) / &self.std_dev)
    }

    /// Undo [`ColumnStats::apply`]
    pub fn invert(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.width() {
            return Err(PreprocessError::shape(
                "column destandardization",
                format!("{} columns", self.width()),
                format!("{} columns", data.ncols()),
            ));
        }
        Ok(&data * &self.std_dev + &self.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    #[test]
    fn test_scalar_stats() {
        let values = array![[2.0, 4.0, 4.0, 4.0], [5.0, 5.0, 7.0, 9.0]];
        let stats = ScalarStats::compute(values.view()).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_stats() {
        let values = array![[1.0, 10.0], [3.0, 10.0]];
        let stats = ColumnStats::compute(values.view()).unwrap();
        assert_eq!(stats.mean, array![2.0, 10.0]);
        assert_eq!(stats.std_dev, array![1.0, 0.0]);
    }

    #[test]
    fn test_empty_training_rejected() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(ScalarStats::compute(empty.view()).is_err());
        assert!(ColumnStats::compute(empty.view()).is_err());
    }

    #[test]
    fn test_column_round_trip() {
        let values = array![[1.0, -2.0], [3.0, 5.0], [4.0, 0.5]];
        let stats = ColumnStats::compute(values.view()).unwrap();
        let back = stats.invert(stats.apply(values.view()).unwrap().view()).unwrap();
        for (a, b) in back.iter().zip(values.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn restandardizing_is_stable(rows in prop::collection::vec(prop::collection::vec(-1e3f64..1e3, 4), 3..20)) {
            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            let data = Array2::from_shape_vec((rows.len(), 4), flat).unwrap();
            let stats = ScalarStats::compute(data.view()).unwrap();
            prop_assume!(stats.std_dev > 1e-3);

            let once = stats.apply(data.view());
            let again = ScalarStats::compute(once.view()).unwrap();
            prop_assert!(again.mean.abs() < 1e-9);
            prop_assert!((again.std_dev - 1.0).abs() < 1e-9);
        }
    }
}
