use crate::config::FftSignal;
use serde::{Deserialize, Serialize};

/// Column order shared by the CSV primary stream and the processed log.
pub const SAMPLE_COLUMNS: [&str; 13] = [
    "seq",
    "fs_hz",
    "D",
    "deltaD",
    "step_nm",
    "x_nm",
    "v_nm_s",
    "x_nm_ema",
    "x_nm_ma",
    "x_nm_env",
    "angle_deg",
    "x2",
    "y2",
];

/// One kept, fully conditioned sample.
///
/// Disabled features serialize as `null` (JSON) or an empty field (CSV); the
/// fields are never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub seq: i64,
    pub fs_hz: f64,
    #[serde(rename = "D")]
    pub counter: i64,
    #[serde(rename = "deltaD")]
    pub delta_counter: i64,
    pub step_nm: f64,
    pub x_nm: f64,
    pub v_nm_s: f64,
    pub x_nm_ema: Option<f64>,
    pub x_nm_ma: Option<f64>,
    pub x_nm_env: f64,
    pub angle_deg: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

/// Windowed FFT snapshot over recent kept samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub signal: FftSignal,
    pub fs_hz: f64,
    pub freq: Vec<f64>,
    pub mag: Vec<f64>,
}

impl SpectralRecord {
    pub const KIND: &'static str = "fft";

    pub fn new(signal: FftSignal, fs_hz: f64, freq: Vec<f64>, mag: Vec<f64>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            signal,
            fs_hz,
            freq,
            mag,
        }
    }
}
