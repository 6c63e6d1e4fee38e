//! Peak Amplitude Rescaling and Time Alignment
//!
//! Every seismogram is scaled so that its peak matches the peak of the
//! reference seismogram (sample 0). In [`RescaleMode::Full`] the seismogram
//! is also shifted so its peak lands on the reference peak index. Samples
//! shifted off one end are dropped and the vacated end is zero-filled; there
//! is no wrap-around.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use sample_set::{PreprocessError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which rescaling to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RescaleMode {
    /// Amplitude ratio and peak time alignment
    Full,
    /// Amplitude ratio only
    AmplitudeOnly,
}

/// Per-sample rescale factors, in original sample order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescaleRecord {
    /// Mode the record was produced by
    pub mode: RescaleMode,
    /// Reference peak amplitude divided by each sample's peak amplitude
    pub amplitude_ratios: Vec<f64>,
    /// Reference peak index minus each sample's peak index (full mode only)
    pub shift_indices: Option<Vec<i64>>,
}

/// Peak value and its first index
fn peak(row: ArrayView1<'_, f64>) -> (f64, usize) {
    row.iter()
        .enumerate()
        .fold((f64::NEG_INFINITY, 0), |(best, at), (i, &v)| {
            if v > best {
                (v, i)
            } else {
                (best, at)
            }
        })
}

/// Shift a signal by `shift` samples, filling vacated positions with zero.
///
/// Positive shifts move content towards higher indices.
pub fn shift_zero_fill(row: ArrayView1<'_, f64>, shift: i64) -> Array1<f64> {
    let n = row.len() as i64;
    Array1::from_shape_fn(row.len(), |j| {
        let src = j as i64 - shift;
        if (0..n).contains(&src) {
            row[src as usize]
        } else {
            0.0
        }
    })
}

/// Rescale every row against row 0
pub(crate) fn rescale(data: ArrayView2<'_, f64>, mode: RescaleMode) -> Result<(Array2<f64>, RescaleRecord)> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(PreprocessError::shape(
            "rescale",
            "at least one non-empty reference sample",
            format!("{}x{} array", data.nrows(), data.ncols()),
        ));
    }

    let (ref_amplitude, ref_index) = peak(data.row(0));
    info!("Reference peak amplitude: {}, time index: {}", ref_amplitude, ref_index);

    let mut out = Array2::zeros(data.raw_dim());
    let mut amplitude_ratios = Vec::with_capacity(data.nrows());
    let mut shift_indices = Vec::with_capacity(data.nrows());

    for (i, row) in data.outer_iter().enumerate() {
        let (amplitude, index) = peak(row);
        let ratio = ref_amplitude / amplitude;
        let scaled = row.mapv(|v| v * ratio);

        match mode {
            RescaleMode::Full => {
                let shift = ref_index as i64 - index as i64;
                out.row_mut(i).assign(&shift_zero_fill(scaled.view(), shift));
                shift_indices.push(shift);
            }
            RescaleMode::AmplitudeOnly => out.row_mut(i).assign(&scaled),
        }
        amplitude_ratios.push(ratio);
    }
    debug!("Rescaled {} samples ({:?})", data.nrows(), mode);

    let record = RescaleRecord {
        mode,
        amplitude_ratios,
        shift_indices: (mode == RescaleMode::Full).then_some(shift_indices),
    };
    Ok((out, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    #[test]
    fn test_shift_zero_fill() {
        let row = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(shift_zero_fill(row.view(), 1), array![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(shift_zero_fill(row.view(), -2), array![3.0, 4.0, 0.0, 0.0]);
        assert_eq!(shift_zero_fill(row.view(), 0), row);
        assert_eq!(shift_zero_fill(row.view(), 9), array![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_full_rescale() {
        let data = array![[0.0, 4.0, 1.0, 0.0], [0.0, 0.0, 1.0, 2.0]];
        let (out, record) = rescale(data.view(), RescaleMode::Full).unwrap();

        assert_eq!(record.amplitude_ratios, vec![1.0, 2.0]);
        assert_eq!(record.shift_indices, Some(vec![0, -2]));
        assert_eq!(out.row(1).to_owned(), array![2.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_amplitude_only() {
        let data = array![[0.0, 4.0], [2.0, 1.0]];
        let (out, record) = rescale(data.view(), RescaleMode::AmplitudeOnly).unwrap();
        assert_eq!(record.shift_indices, None);
        assert_eq!(out, array![[0.0, 4.0], [4.0, 2.0]]);
    }

    #[test]
    fn test_empty_input_rejected() {
        let data = Array2::<f64>::zeros((0, 4));
        assert!(rescale(data.view(), RescaleMode::Full).is_err());
    }

    proptest! {
        #[test]
        fn full_rescale_aligns_peaks(rows in prop::collection::vec(prop::collection::vec(0.1f64..10.0, 16), 1..10)) {
            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            let data = Array2::from_shape_vec((rows.len(), 16), flat).unwrap();
            let (out, record) = rescale(data.view(), RescaleMode::Full).unwrap();
            let (ref_amp, ref_idx) = peak(data.row(0));

            for (i, row) in out.outer_iter().enumerate() {
                let (amp, idx) = peak(row);
                prop_assert!((amp - ref_amp).abs() <= 1e-9 * ref_amp);
                prop_assert_eq!(idx, ref_idx);
                prop_assert!(record.amplitude_ratios[i] > 0.0);
            }
        }
    }
}
