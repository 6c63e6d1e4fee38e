//! Real FFT Power Spectrum

use ndarray::{s, Array1, ArrayView1};
use rustfft::{num_complex::Complex, FftPlanner};
use sample_set::{PreprocessError, Result};
use serde::{Deserialize, Serialize};

/// Half-open range of rFFT bins `[start, cut)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// First bin kept
    pub start: usize,
    /// One past the last bin kept
    pub cut: usize,
}

impl FrequencyBand {
    /// Create a new band
    pub fn new(start: usize, cut: usize) -> Self {
        Self { start, cut }
    }

    /// Number of bins in the band
    pub fn width(&self) -> usize {
        self.cut.saturating_sub(self.start)
    }

    /// Check the band is non-empty
    pub fn check_nonempty(&self) -> Result<()> {
        if self.start >= self.cut {
            return Err(PreprocessError::invalid(
                "band",
                format!("start {} must be below cut {}", self.start, self.cut),
            ));
        }
        Ok(())
    }

    /// Check the band is non-empty and fits the rFFT of a `signal_len` signal
    pub fn validate(&self, signal_len: usize) -> Result<()> {
        self.check_nonempty()?;
        let bins = signal_len / 2 + 1;
        if self.cut > bins {
            return Err(PreprocessError::invalid(
                "band",
                format!("cut {} exceeds the {} rFFT bins of a length-{} signal", self.cut, bins, signal_len),
            ));
        }
        Ok(())
    }
}

/// Power spectrum analyzer for real signals
pub struct PowerSpectrumAnalyzer {
    /// FFT planner for efficient computation
    planner: FftPlanner<f64>,
}

impl Default for PowerSpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSpectrumAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Unnormalized power `re² + im²` at the `L/2 + 1` non-negative frequencies
    pub fn power(&mut self, signal: ArrayView1<'_, f64>) -> Array1<f64> {
        let n = signal.len();
        if n == 0 {
            return Array1::zeros(1);
        }

        let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        buffer.iter().take(n / 2 + 1).map(|c| c.norm_sqr()).collect()
    }

    /// Decimal log of the power inside `band`
    pub fn band_log_power(&mut self, signal: ArrayView1<'_, f64>, band: FrequencyBand) -> Result<Array1<f64>> {
        band.validate(signal.len())?;
        let power = self.power(signal);
        Ok(power.slice(s![band.start..band.cut]).mapv(f64::log10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn naive_power(signal: &[f64], k: usize) -> f64 {
        let n = signal.len() as f64;
        let (mut re, mut im) = (0.0, 0.0);
        for (t, &x) in signal.iter().enumerate() {
            let angle = -2.0 * std::f64::consts::PI * k as f64 * t as f64 / n;
            re += x * angle.cos();
            im += x * angle.sin();
        }
        re * re + im * im
    }

    #[test]
    fn test_power_matches_dft() {
        let signal: Vec<f64> = (0..16).map(|i| ((i * 7) % 5) as f64 - 1.5).collect();
        let mut analyzer = PowerSpectrumAnalyzer::new();
        let power = analyzer.power(Array1::from(signal.clone()).view());

        assert_eq!(power.len(), 9);
        for (k, &p) in power.iter().enumerate() {
            assert!((p - naive_power(&signal, k)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_odd_length_bins() {
        let mut analyzer = PowerSpectrumAnalyzer::new();
        let power = analyzer.power(Array1::from(vec![1.0; 7]).view());
        assert_eq!(power.len(), 4);
        assert!((power[0] - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_sine_peak_bin() {
        let signal: Array1<f64> = (0..64)
            .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / 64.0).sin())
            .collect();
        let mut analyzer = PowerSpectrumAnalyzer::new();
        let power = analyzer.power(signal.view());
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 4);
    }

    #[test]
    fn test_band_validation() {
        assert!(FrequencyBand::new(1, 9).validate(16).is_ok());
        assert!(FrequencyBand::new(1, 10).validate(16).is_err());
        assert!(FrequencyBand::new(3, 3).validate(16).is_err());
        assert_eq!(FrequencyBand::new(2, 7).width(), 5);
    }
}
