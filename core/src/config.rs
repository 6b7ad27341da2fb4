use crate::prelude::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default HeNe laser wavelength in nanometres.
pub const DEFAULT_LAMBDA_NM: f64 = 632.991;
/// Sample rate assumed when neither an override nor a header line supplied one.
pub const FALLBACK_SAMPLE_RATE_HZ: f64 = 1000.0;

/// Which samples survive the first emission stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitPolicy {
    #[default]
    Every,
    OnStep,
}

/// Whether the sample carries an angle derived from the displacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    #[default]
    Displacement,
    Angle,
}

/// Signal fed to the spectral analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftSignal {
    #[default]
    X,
    V,
}

impl FftSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            FftSignal::X => "x",
            FftSignal::V => "v",
        }
    }
}

impl fmt::Display for FftSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_from_str {
    ($ty:ty, $what:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        $what,
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

impl_from_str!(EmitPolicy, "emit policy", {
    "every" => EmitPolicy::Every,
    "onstep" => EmitPolicy::OnStep,
});
impl_from_str!(MeasureMode, "mode", {
    "displacement" => MeasureMode::Displacement,
    "angle" => MeasureMode::Angle,
});
impl_from_str!(FftSignal, "fft signal", { "x" => FftSignal::X, "v" => FftSignal::V });

/// One environmental compensation axis: `1 + k * (measured - reference)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvAxis {
    pub measured: Option<f64>,
    pub reference: Option<f64>,
    pub coefficient: f64,
}

impl EnvAxis {
    pub fn new(measured: Option<f64>, reference: Option<f64>, coefficient: f64) -> Self {
        Self {
            measured,
            reference,
            coefficient,
        }
    }

    /// Multiplicative factor contributed by this axis, if it is fully configured.
    pub fn factor(&self) -> Option<f64> {
        match (self.measured, self.reference) {
            (Some(measured), Some(reference)) if self.coefficient != 0.0 => {
                Some(1.0 + self.coefficient * (measured - reference))
            }
            _ => None,
        }
    }
}

/// Immutable tunables shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sample-rate override in Hz; `0` means take it from the stream header.
    pub sample_rate_hz: f64,
    pub emit: EmitPolicy,
    pub decimate: u32,
    /// Explicit nm per count, overriding `lambda_nm / scale_div`.
    pub step_nm: Option<f64>,
    pub lambda_nm: f64,
    pub scale_div: u32,
    /// Baseline the cumulative position starts from.
    pub start_nm: f64,
    pub straight_mult: f64,
    pub mode: MeasureMode,
    pub angle_norm_nm: f64,
    pub angle_corr: f64,
    pub ema_alpha: f64,
    pub ma_window: usize,
    pub env_temperature: EnvAxis,
    pub env_pressure: EnvAxis,
    pub env_humidity: EnvAxis,
    pub fft_len: usize,
    pub fft_every: u64,
    pub fft_signal: FftSignal,
    /// Capture the secondary `X`/`Y` channel tokens.
    pub enable_xy: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 0.0,
            emit: EmitPolicy::Every,
            decimate: 1,
            step_nm: None,
            lambda_nm: DEFAULT_LAMBDA_NM,
            scale_div: 8,
            start_nm: 0.0,
            straight_mult: 1.0,
            mode: MeasureMode::Displacement,
            angle_norm_nm: 1.0,
            angle_corr: 1.0,
            ema_alpha: 0.0,
            ma_window: 0,
            env_temperature: EnvAxis::default(),
            env_pressure: EnvAxis::default(),
            env_humidity: EnvAxis::default(),
            fft_len: 0,
            fft_every: 0,
            fft_signal: FftSignal::X,
            enable_xy: false,
        }
    }
}

impl PipelineConfig {
    /// Rejects combinations the pipeline cannot run with.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.decimate == 0 {
            return Err(invalid("decimate must be at least 1"));
        }
        if !matches!(self.scale_div, 1 | 2 | 4 | 8) {
            return Err(invalid(format!(
                "scale_div must be one of 1, 2, 4, 8 (got {})",
                self.scale_div
            )));
        }
        if !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(invalid(format!(
                "ema_alpha must lie in [0, 1] (got {})",
                self.ema_alpha
            )));
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz < 0.0 {
            return Err(invalid(format!(
                "sample_rate_hz must be a non-negative number (got {})",
                self.sample_rate_hz
            )));
        }
        Ok(())
    }

    pub fn step_nm_per_count(&self) -> f64 {
        match self.step_nm {
            Some(step) => step,
            None => self.lambda_nm / f64::from(self.scale_div.max(1)),
        }
    }

    /// Product of the configured environmental factors; exactly `1.0` when none apply.
    pub fn environment_scale(&self) -> f64 {
        [self.env_temperature, self.env_pressure, self.env_humidity]
            .iter()
            .filter_map(EnvAxis::factor)
            .fold(1.0, |scale, factor| scale * factor)
    }

    pub fn spectral_enabled(&self) -> bool {
        self.fft_len > 0 && self.fft_every > 0
    }
}

fn invalid(message: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfig(message.into())
}
