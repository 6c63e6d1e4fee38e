//! PCA Compression
//!
//! Fits a principal component basis on standardized training spectra and
//! projects every sample onto it.

mod basis;
mod compressor;

pub use basis::PcaBasis;
pub use compressor::{PcaCompression, PcaCompressor, PcaConfig};
