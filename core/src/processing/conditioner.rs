use crate::config::{MeasureMode, PipelineConfig};
use crate::math::StatsHelper;
use crate::prelude::ProcessingStage;
use crate::processing::integrator::ProvisionalSample;
use crate::processing::state::PipelineState;
use crate::protocol::SampleRecord;

/// Completes a provisional sample with smoothing, compensation and angle fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conditioner;

impl ProcessingStage for Conditioner {
    type Input = ProvisionalSample;
    type Output = SampleRecord;

    fn execute(
        &mut self,
        config: &PipelineConfig,
        state: &mut PipelineState,
        sample: ProvisionalSample,
    ) -> SampleRecord {
        let x_nm = sample.x_nm;

        SampleRecord {
            seq: sample.seq,
            fs_hz: sample.fs_hz,
            counter: sample.counter,
            delta_counter: sample.delta_counter,
            step_nm: sample.step_nm,
            x_nm,
            v_nm_s: sample.v_nm_s,
            x_nm_ema: exponential_average(config, state, x_nm),
            x_nm_ma: moving_average(config, state, x_nm),
            x_nm_env: x_nm * config.environment_scale(),
            angle_deg: match config.mode {
                MeasureMode::Angle => Some(angle_from_displacement(config, x_nm)),
                MeasureMode::Displacement => None,
            },
            x2: sample.x2,
            y2: sample.y2,
        }
    }
}

fn exponential_average(
    config: &PipelineConfig,
    state: &mut PipelineState,
    x_nm: f64,
) -> Option<f64> {
    let alpha = config.ema_alpha;
    if alpha <= 0.0 {
        return None;
    }
    let next = match state.ema_state {
        Some(prev) => alpha * x_nm + (1.0 - alpha) * prev,
        None => x_nm,
    };
    state.ema_state = Some(next);
    Some(next)
}

fn moving_average(
    config: &PipelineConfig,
    state: &mut PipelineState,
    x_nm: f64,
) -> Option<f64> {
    if config.ma_window == 0 {
        return None;
    }
    let buffer = &mut state.moving_avg_buffer;
    if buffer.capacity() != config.ma_window {
        buffer.set_capacity(config.ma_window);
    }
    buffer.push(x_nm);
    StatsHelper::mean(buffer.iter())
}

/// `asin(x / norm)` in degrees, clamped to the valid domain and scaled by the
/// correction factor. A zero normalization yields `0.0`.
pub fn angle_from_displacement(config: &PipelineConfig, x_nm: f64) -> f64 {
    if config.angle_norm_nm == 0.0 {
        return 0.0;
    }
    let ratio = StatsHelper::clamp(x_nm / config.angle_norm_nm, -1.0, 1.0);
    ratio.asin() * config.angle_corr * (180.0 / std::f64::consts::PI)
}
