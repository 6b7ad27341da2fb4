use crate::config::PipelineConfig;
use crate::prelude::{PipelineResult, ProcessingStage};
use crate::processing::conditioner::Conditioner;
use crate::processing::emission::{EmissionFilter, Rejection};
use crate::processing::integrator::Integrator;
use crate::processing::spectral::SpectralAnalyzer;
use crate::processing::state::PipelineState;
use crate::protocol::{parse_line, ParsedLine, SampleRecord, SpectralRecord};
use crate::telemetry::MetricsRecorder;
use log::{debug, trace};

/// What a single raw line turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Blank,
    Header { sample_frequency_hz: f64 },
    /// No `D`/`DIFF` counter on the line; state untouched.
    Dropped,
    Filtered(Rejection),
    Emitted {
        sample: SampleRecord,
        spectrum: Option<SpectralRecord>,
    },
}

/// Single-owner driver that pushes raw lines through every stage.
pub struct Pipeline {
    config: PipelineConfig,
    state: PipelineState,
    integrator: Integrator,
    conditioner: Conditioner,
    emission: EmissionFilter,
    spectral: Option<SpectralAnalyzer>,
    metrics: MetricsRecorder,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let state = PipelineState::new(&config);
        let spectral = SpectralAnalyzer::resolve(&config);
        Ok(Self {
            config,
            state,
            integrator: Integrator,
            conditioner: Conditioner,
            emission: EmissionFilter,
            spectral,
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn spectral_active(&self) -> bool {
        self.spectral.is_some()
    }

    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        self.metrics.record_line();
        let outcome = self.advance(line);
        match &outcome {
            LineOutcome::Blank => {}
            LineOutcome::Header {
                sample_frequency_hz,
            } => {
                self.metrics.record_header();
                debug!("sample frequency announced: {} Hz", sample_frequency_hz);
            }
            LineOutcome::Dropped => {
                self.metrics.record_dropped();
                trace!("no counter on line {:?}", line);
            }
            LineOutcome::Filtered(_) => self.metrics.record_filtered(),
            LineOutcome::Emitted { spectrum, .. } => {
                self.metrics.record_emitted(spectrum.is_some());
            }
        }
        outcome
    }

    fn advance(&mut self, line: &str) -> LineOutcome {
        let frame = match parse_line(line, self.config.enable_xy) {
            ParsedLine::Blank => return LineOutcome::Blank,
            ParsedLine::Header {
                sample_frequency_hz,
            } => {
                self.state.sample_frequency_hz = sample_frequency_hz;
                return LineOutcome::Header {
                    sample_frequency_hz,
                };
            }
            ParsedLine::NoCounter { .. } => return LineOutcome::Dropped,
            ParsedLine::Data(frame) => frame,
        };

        self.metrics.record_frame();
        let provisional = self.integrator.execute(&self.config, &mut self.state, frame);
        let sample = self.conditioner.execute(&self.config, &mut self.state, provisional);

        if let Err(rejection) = self
            .emission
            .execute(&self.config, &mut self.state, sample.delta_counter)
        {
            return LineOutcome::Filtered(rejection);
        }

        let spectrum = self
            .spectral
            .as_mut()
            .and_then(|analyzer| analyzer.observe(&mut self.state, &sample));

        LineOutcome::Emitted { sample, spectrum }
    }
}
