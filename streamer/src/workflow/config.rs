use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use umdcore::config::{EmitPolicy, EnvAxis, FftSignal, MeasureMode, DEFAULT_LAMBDA_NM};
use umdcore::PipelineConfig;

/// Pipeline tunables as command-line flags.
#[derive(Args, Clone, Debug)]
pub struct TunableArgs {
    /// Override sample frequency in Hz (0 = header announcement, else 1000)
    #[arg(long, default_value_t = 0.0)]
    pub fs: f64,
    /// Emit every sample or only on deltaD != 0 [every, onstep]
    #[arg(long, default_value = "every")]
    pub emit: EmitPolicy,
    /// After the emit filter, output only every Nth kept record
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub decimate: u32,

    /// Explicit nm per count (overrides --lambda-nm / --scale-div)
    #[arg(long)]
    pub stepnm: Option<f64>,
    /// Laser wavelength in nm
    #[arg(long, default_value_t = DEFAULT_LAMBDA_NM)]
    pub lambda_nm: f64,
    /// Interferometer division factor [1, 2, 4, 8]
    #[arg(long, default_value_t = 8)]
    pub scale_div: u32,
    /// Starting baseline for x_nm
    #[arg(long, default_value_t = 0.0)]
    pub startnm: f64,
    /// Straightness multiplier, reapplied to the running x_nm on every sample
    #[arg(long, default_value_t = 1.0)]
    pub straight_mult: f64,

    /// Output mode [displacement, angle]
    #[arg(long, default_value = "displacement")]
    pub mode: MeasureMode,
    #[arg(long, default_value_t = 1.0)]
    pub angle_norm_nm: f64,
    #[arg(long, default_value_t = 1.0)]
    pub angle_corr: f64,

    /// EMA smoothing factor in [0, 1]; 0 disables
    #[arg(long, default_value_t = 0.0)]
    pub ema_alpha: f64,
    /// Moving-average window in samples; 0 disables
    #[arg(long, default_value_t = 0)]
    pub ma_window: usize,

    #[arg(long)]
    pub env_temp: Option<f64>,
    #[arg(long)]
    pub env_temp0: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    pub env_ktemp: f64,
    #[arg(long)]
    pub env_press: Option<f64>,
    #[arg(long)]
    pub env_press0: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    pub env_kpress: f64,
    #[arg(long)]
    pub env_hum: Option<f64>,
    #[arg(long)]
    pub env_hum0: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    pub env_khum: f64,

    /// FFT length in kept samples; 0 disables snapshots
    #[arg(long, default_value_t = 0)]
    pub fft_len: usize,
    /// Emit a snapshot every N kept samples; 0 disables snapshots
    #[arg(long, default_value_t = 0)]
    pub fft_every: u64,
    /// Signal analysed by the FFT [x, v]
    #[arg(long, default_value = "x")]
    pub fft_signal: FftSignal,

    /// Capture the secondary X/Y channel tokens
    #[arg(long, default_value_t = false)]
    pub enable_xy: bool,
}

/// Tunables of one run, loadable from YAML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(args: &TunableArgs) -> Self {
        Self {
            pipeline: PipelineConfig {
                sample_rate_hz: args.fs,
                emit: args.emit,
                decimate: args.decimate,
                step_nm: args.stepnm,
                lambda_nm: args.lambda_nm,
                scale_div: args.scale_div,
                start_nm: args.startnm,
                straight_mult: args.straight_mult,
                mode: args.mode,
                angle_norm_nm: args.angle_norm_nm,
                angle_corr: args.angle_corr,
                ema_alpha: args.ema_alpha,
                ma_window: args.ma_window,
                env_temperature: EnvAxis::new(args.env_temp, args.env_temp0, args.env_ktemp),
                env_pressure: EnvAxis::new(args.env_press, args.env_press0, args.env_kpress),
                env_humidity: EnvAxis::new(args.env_hum, args.env_hum0, args.env_khum),
                fft_len: args.fft_len,
                fft_every: args.fft_every,
                fft_signal: args.fft_signal,
                enable_xy: args.enable_xy,
            },
        }
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        self.pipeline.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        tunables: TunableArgs,
    }

    fn parse(args: &[&str]) -> WorkflowConfig {
        let harness = Harness::parse_from(std::iter::once("umd2").chain(args.iter().copied()));
        WorkflowConfig::from_args(&harness.tunables)
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        assert_eq!(parse(&[]).to_pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn flags_map_onto_pipeline_config() {
        let cfg = parse(&[
            "--emit",
            "onstep",
            "--decimate",
            "3",
            "--scale-div",
            "4",
            "--mode",
            "angle",
            "--env-temp",
            "22",
            "--env-temp0",
            "20",
            "--env-ktemp",
            "0.5",
            "--fft-signal",
            "v",
            "--enable-xy",
        ])
        .to_pipeline_config();
        assert_eq!(cfg.emit, EmitPolicy::OnStep);
        assert_eq!(cfg.decimate, 3);
        assert_eq!(cfg.scale_div, 4);
        assert_eq!(cfg.mode, MeasureMode::Angle);
        assert_eq!(cfg.env_temperature.factor(), Some(2.0));
        assert_eq!(cfg.fft_signal, FftSignal::V);
        assert!(cfg.enable_xy);
    }

    #[test]
    fn zero_decimation_is_rejected_by_the_parser() {
        let harness = Harness::try_parse_from(["umd2", "--decimate", "0"]);
        assert!(harness.is_err());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"emit: onstep\nscale_div: 2\nma_window: 5\n\
              env_pressure:\n  measured: 1013.0\n  reference: 1000.0\n  coefficient: 0.001\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap().to_pipeline_config();
        assert_eq!(cfg.emit, EmitPolicy::OnStep);
        assert_eq!(cfg.scale_div, 2);
        assert_eq!(cfg.ma_window, 5);
        assert_eq!(cfg.env_pressure.reference, Some(1000.0));
        assert_eq!(cfg.lambda_nm, DEFAULT_LAMBDA_NM);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/no/such/workflow.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
