use crate::config::PipelineConfig;
use crate::processing::PipelineState;
use std::io;

/// Common error type for the processing core.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("cannot open {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot open device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("device link failed: {0}")]
    DeviceLink(#[source] io::Error),
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("csv encoding failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// One step of the per-line chain. Stages keep nothing between lines; all
/// mutable state lives in the [`PipelineState`] the driver lends them.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn execute(
        &mut self,
        config: &PipelineConfig,
        state: &mut PipelineState,
        input: Self::Input,
    ) -> Self::Output;
}
