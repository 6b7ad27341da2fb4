use crate::config::{EmitPolicy, PipelineConfig};
use crate::prelude::ProcessingStage;
use crate::processing::state::PipelineState;

/// Why a conditioned sample was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `onstep` policy and the counter did not move.
    NoStep,
    /// Passed the policy but fell between decimation points.
    Decimated,
}

/// Applies the emit policy, then decimation over the kept count.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionFilter;

impl ProcessingStage for EmissionFilter {
    type Input = i64;
    type Output = Result<(), Rejection>;

    fn execute(
        &mut self,
        config: &PipelineConfig,
        state: &mut PipelineState,
        delta_counter: i64,
    ) -> Result<(), Rejection> {
        if config.emit == EmitPolicy::OnStep && delta_counter == 0 {
            return Err(Rejection::NoStep);
        }

        state.kept_counter += 1;
        let decimate = u64::from(config.decimate);
        if decimate > 1 && state.kept_counter % decimate != 0 {
            return Err(Rejection::Decimated);
        }
        Ok(())
    }
}
