//! Periodic windowed-FFT snapshots over the kept-sample stream.
//!
//! The transform is only available with the `spectral` feature. Without it the
//! analyzer never resolves and the pipeline runs without snapshots.

use crate::config::{FftSignal, PipelineConfig};
#[cfg(feature = "spectral")]
use crate::math::{hann, rfft_frequencies, FftHelper};
use crate::processing::state::PipelineState;
use crate::protocol::{SampleRecord, SpectralRecord};
use crate::telemetry::LogManager;

pub struct SpectralAnalyzer {
    signal: FftSignal,
    fft_len: usize,
    fft_every: u64,
    #[cfg(feature = "spectral")]
    window: Vec<f64>,
    #[cfg(feature = "spectral")]
    fft: FftHelper,
}

impl SpectralAnalyzer {
    /// Resolves the spectral capability once for the configured run.
    pub fn resolve(config: &PipelineConfig) -> Option<Self> {
        if !config.spectral_enabled() {
            return None;
        }
        Self::with_capability(config)
    }

    #[cfg(feature = "spectral")]
    fn with_capability(config: &PipelineConfig) -> Option<Self> {
        LogManager::new("spectral").record(&format!(
            "fft snapshots of '{}' every {} kept samples over {} points",
            config.fft_signal, config.fft_every, config.fft_len
        ));
        Some(Self {
            signal: config.fft_signal,
            fft_len: config.fft_len,
            fft_every: config.fft_every,
            window: hann(config.fft_len),
            fft: FftHelper::new(config.fft_len),
        })
    }

    #[cfg(not(feature = "spectral"))]
    fn with_capability(_config: &PipelineConfig) -> Option<Self> {
        LogManager::new("spectral")
            .warn("built without the `spectral` feature; fft snapshots disabled");
        None
    }

    /// Buffers the kept sample and returns a snapshot when the cadence is due.
    pub fn observe(
        &mut self,
        state: &mut PipelineState,
        record: &SampleRecord,
    ) -> Option<SpectralRecord> {
        let value = match self.signal {
            FftSignal::X => record.x_nm,
            FftSignal::V => record.v_nm_s,
        };
        state.fft_buffer.push(value);

        let due = state.kept_counter % self.fft_every == 0;
        if state.fft_buffer.len() < self.fft_len || !due {
            return None;
        }
        let values = state.fft_buffer.latest(self.fft_len);
        self.snapshot(&values, state.sample_frequency_hz)
    }

    #[cfg(feature = "spectral")]
    fn snapshot(&mut self, values: &[f64], fs_hz: f64) -> Option<SpectralRecord> {
        let windowed: Vec<f64> = values
            .iter()
            .zip(&self.window)
            .map(|(value, weight)| value * weight)
            .collect();
        let mag = self.fft.real_magnitudes(&windowed);
        let freq = rfft_frequencies(self.fft_len, fs_hz);
        Some(SpectralRecord::new(self.signal, fs_hz, freq, mag))
    }

    #[cfg(not(feature = "spectral"))]
    fn snapshot(&mut self, _values: &[f64], _fs_hz: f64) -> Option<SpectralRecord> {
        None
    }
}

#[cfg(all(test, feature = "spectral"))]
mod tests {
    use super::*;

    fn record(x_nm: f64, v_nm_s: f64) -> SampleRecord {
        SampleRecord {
            seq: 0,
            fs_hz: 1000.0,
            counter: 0,
            delta_counter: 0,
            step_nm: 0.0,
            x_nm,
            v_nm_s,
            x_nm_ema: None,
            x_nm_ma: None,
            x_nm_env: x_nm,
            angle_deg: None,
            x2: None,
            y2: None,
        }
    }

    #[test]
    fn disabled_unless_length_and_cadence_set() {
        let config = PipelineConfig {
            fft_len: 8,
            ..Default::default()
        };
        assert!(SpectralAnalyzer::resolve(&config).is_none());
    }

    #[test]
    fn fires_on_cadence_once_buffer_is_full() {
        let config = PipelineConfig {
            fft_len: 4,
            fft_every: 2,
            sample_rate_hz: 1000.0,
            ..Default::default()
        };
        let mut state = PipelineState::new(&config);
        let mut analyzer = SpectralAnalyzer::resolve(&config).unwrap();

        let mut fired = Vec::new();
        for i in 1..=8u64 {
            state.kept_counter = i;
            if analyzer
                .observe(&mut state, &record(i as f64, 0.0))
                .is_some()
            {
                fired.push(i);
            }
        }
        assert_eq!(fired, vec![4, 6, 8]);
        assert_eq!(state.fft_buffer.len(), 4);
    }

    #[test]
    fn velocity_signal_and_bin_layout() {
        let config = PipelineConfig {
            fft_len: 8,
            fft_every: 1,
            fft_signal: FftSignal::V,
            sample_rate_hz: 800.0,
            ..Default::default()
        };
        let mut state = PipelineState::new(&config);
        let mut analyzer = SpectralAnalyzer::resolve(&config).unwrap();

        let mut last = None;
        for i in 1..=8u64 {
            state.kept_counter = i;
            last = analyzer.observe(&mut state, &record(0.0, 3.0));
        }
        let snapshot = last.unwrap();
        assert_eq!(snapshot.signal, FftSignal::V);
        assert_eq!(snapshot.freq.len(), 5);
        assert_eq!(snapshot.mag.len(), 5);
        assert!((snapshot.freq[4] - 400.0).abs() < 1e-9);
        // Hann-weighted DC of a constant: 3 * sum(w).
        let expected_dc: f64 = hann(8).iter().map(|w| w * 3.0).sum();
        assert!((snapshot.mag[0] - expected_dc).abs() < 1e-9);
    }
}
