#[cfg(feature = "spectral")]
pub mod fft;
pub mod stats;
pub mod window;

#[cfg(feature = "spectral")]
pub use fft::FftHelper;
pub use stats::StatsHelper;
pub use window::{hann, rfft_frequencies};
