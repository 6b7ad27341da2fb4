//! Serialization of kept samples and spectral snapshots.

pub mod primary;
pub mod processed_log;
pub mod raw_log;

pub use primary::PrimarySink;
pub use processed_log::ProcessedLog;
pub use raw_log::RawSidecar;

use crate::prelude::PipelineResult;
use crate::processing::LineOutcome;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Encoding of the primary stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format '{}' (expected one of: jsonl, csv)",
                other
            )),
        }
    }
}

/// Every sink active for one run.
pub struct SinkSet<W: Write> {
    primary: PrimarySink<W>,
    processed: Option<ProcessedLog>,
    raw: Option<RawSidecar>,
}

impl<W: Write> SinkSet<W> {
    pub fn new(primary: PrimarySink<W>) -> Self {
        Self {
            primary,
            processed: None,
            raw: None,
        }
    }

    pub fn with_processed_log(mut self, log: ProcessedLog) -> Self {
        self.processed = Some(log);
        self
    }

    pub fn with_raw_sidecar(mut self, sidecar: RawSidecar) -> Self {
        self.raw = Some(sidecar);
        self
    }

    /// Copies the raw line to the sidecar, if one is attached.
    pub fn mirror_raw(&mut self, line: &str) {
        if let Some(raw) = self.raw.as_mut() {
            raw.record(line);
        }
    }

    /// Writes whatever the outcome produced; non-emitting outcomes are ignored.
    pub fn emit(&mut self, outcome: &LineOutcome) -> PipelineResult<()> {
        let LineOutcome::Emitted { sample, spectrum } = outcome else {
            return Ok(());
        };
        self.primary.write_sample(sample)?;
        if let Some(log) = self.processed.as_mut() {
            log.write_sample(sample)?;
        }
        if let Some(spectrum) = spectrum {
            self.primary.write_spectrum(spectrum)?;
        }
        Ok(())
    }

    pub fn into_primary(self) -> PrimarySink<W> {
        self.primary
    }

    /// Flushes every sink. Handles close when the set is dropped.
    pub fn finish(&mut self) -> PipelineResult<()> {
        let primary = self.primary.flush();
        let processed = match self.processed.as_mut() {
            Some(log) => log.flush(),
            None => Ok(()),
        };
        if let Some(raw) = self.raw.as_mut() {
            raw.flush();
        }
        primary.and(processed)
    }
}
