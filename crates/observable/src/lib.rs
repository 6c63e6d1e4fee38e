//! Inference Observable
//!
//! Builds the log10 power-spectrum observable of a (noisy) seismogram and
//! the inverse covariance of that observable over a noisy training set.

mod covariance;
mod fft;
mod noise;
mod observable;

pub use covariance::{CovarianceBuilder, CovarianceConfig, CovarianceEstimate};
pub use fft::{FrequencyBand, PowerSpectrumAnalyzer};
pub use noise::{seeded_rng, NoiseModel};
pub use observable::{ObservableBuilder, ObservableConfig};
