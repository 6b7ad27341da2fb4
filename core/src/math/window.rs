use std::f64::consts::PI;

/// Symmetric Hann window of `len` points; a single point window is `[1.0]`.
pub fn hann(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let span = (len - 1) as f64;
            (0..len)
                .map(|i| {
                    let m = (2 * i) as f64 - span;
                    0.5 + 0.5 * (PI * m / span).cos()
                })
                .collect()
        }
    }
}

/// Centre frequencies of the `len / 2 + 1` real-FFT bins at `fs_hz`.
pub fn rfft_frequencies(len: usize, fs_hz: f64) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    let spacing = 1.0 / fs_hz;
    let step = 1.0 / (len as f64 * spacing);
    (0..=len / 2).map(|k| k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_is_symmetric_and_tapers_to_zero() {
        let w = hann(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12);
        assert!(w[4].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!((w[1] - w[3]).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_windows() {
        assert!(hann(0).is_empty());
        assert_eq!(hann(1), vec![1.0]);
    }

    #[test]
    fn frequencies_reach_nyquist() {
        let freq = rfft_frequencies(8, 2000.0);
        assert_eq!(freq.len(), 5);
        assert_eq!(freq[0], 0.0);
        assert!((freq[1] - 250.0).abs() < 1e-9);
        assert!((freq[4] - 1000.0).abs() < 1e-9);
    }
}
