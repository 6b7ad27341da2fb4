use crate::config::PipelineConfig;
use crate::prelude::ProcessingStage;
use crate::processing::state::PipelineState;
use crate::protocol::Frame;

/// Output of the integrator before conditioning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProvisionalSample {
    pub seq: i64,
    pub fs_hz: f64,
    pub counter: i64,
    pub delta_counter: i64,
    pub step_nm: f64,
    pub x_nm: f64,
    pub v_nm_s: f64,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

/// Advances the fringe counter and cumulative position by one frame.
///
/// The straightness multiplier scales the whole running total on every frame,
/// not only the new increment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integrator;

impl ProcessingStage for Integrator {
    type Input = Frame;
    type Output = ProvisionalSample;

    fn execute(
        &mut self,
        config: &PipelineConfig,
        state: &mut PipelineState,
        frame: Frame,
    ) -> ProvisionalSample {
        let fs_hz = state.resolve_sample_frequency();

        let delta_counter = match state.prev_counter {
            Some(prev) => frame.counter.wrapping_sub(prev),
            None => 0,
        };
        state.prev_counter = Some(frame.counter);

        let step_nm = config.step_nm_per_count() * delta_counter as f64;
        state.cumulative_x_nm = (state.cumulative_x_nm + step_nm) * config.straight_mult;

        ProvisionalSample {
            seq: frame.seq,
            fs_hz,
            counter: frame.counter,
            delta_counter,
            step_nm,
            x_nm: state.cumulative_x_nm,
            v_nm_s: step_nm * fs_hz,
            x2: frame.x2,
            y2: frame.y2,
        }
    }
}
