use serde::Serialize;
use std::fmt;

/// Per-run line accounting, owned by the pipeline driver.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    inner: Metrics,
}

/// Copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub lines: u64,
    pub headers: u64,
    pub frames: u64,
    pub dropped: u64,
    pub filtered: u64,
    pub emitted: u64,
    pub spectra: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&mut self) {
        self.inner.lines += 1;
    }

    pub fn record_header(&mut self) {
        self.inner.headers += 1;
    }

    pub fn record_frame(&mut self) {
        self.inner.frames += 1;
    }

    pub fn record_dropped(&mut self) {
        self.inner.dropped += 1;
    }

    pub fn record_filtered(&mut self) {
        self.inner.filtered += 1;
    }

    pub fn record_emitted(&mut self, with_spectrum: bool) {
        self.inner.emitted += 1;
        if with_spectrum {
            self.inner.spectra += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lines={} headers={} frames={} dropped={} filtered={} emitted={} spectra={}",
            self.lines,
            self.headers,
            self.frames,
            self.dropped,
            self.filtered,
            self.emitted,
            self.spectra
        )
    }
}
