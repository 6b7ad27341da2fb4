use crate::config::{PipelineConfig, FALLBACK_SAMPLE_RATE_HZ};
use crate::processing::ring_buffer::RingBuffer;

/// All mutable state of a running pipeline. Owned by the driver and lent to
/// each stage in turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub sample_frequency_hz: f64,
    pub prev_counter: Option<i64>,
    pub cumulative_x_nm: f64,
    pub ema_state: Option<f64>,
    pub moving_avg_buffer: RingBuffer,
    /// Samples that passed the emit policy; drives decimation and FFT cadence.
    pub kept_counter: u64,
    pub fft_buffer: RingBuffer,
}

impl PipelineState {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            sample_frequency_hz: config.sample_rate_hz.max(0.0),
            prev_counter: None,
            cumulative_x_nm: config.start_nm,
            ema_state: None,
            moving_avg_buffer: RingBuffer::with_capacity(config.ma_window),
            kept_counter: 0,
            fft_buffer: RingBuffer::with_capacity(if config.spectral_enabled() {
                config.fft_len
            } else {
                0
            }),
        }
    }

    /// Current sample rate, falling back to 1 kHz if nothing announced one yet.
    pub fn resolve_sample_frequency(&mut self) -> f64 {
        if self.sample_frequency_hz <= 0.0 {
            self.sample_frequency_hz = FALLBACK_SAMPLE_RATE_HZ;
        }
        self.sample_frequency_hz
    }
}
