use crate::output::OutputFormat;
use crate::prelude::{PipelineError, PipelineResult};
use crate::protocol::{SampleRecord, SpectralRecord, SAMPLE_COLUMNS};
use std::io::{self, Write};

/// The consumer-facing record stream.
pub enum PrimarySink<W: Write> {
    Jsonl(W),
    Csv(csv::Writer<W>),
}

/// CSV writer shared by the primary stream and the processed log.
pub(crate) fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

impl<W: Write> PrimarySink<W> {
    /// Creates the stream; CSV emits its header row immediately.
    pub fn new(format: OutputFormat, writer: W) -> PipelineResult<Self> {
        match format {
            OutputFormat::Jsonl => Ok(PrimarySink::Jsonl(writer)),
            OutputFormat::Csv => {
                let mut csv = csv_writer(writer);
                csv.write_record(SAMPLE_COLUMNS)?;
                csv.flush()?;
                Ok(PrimarySink::Csv(csv))
            }
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            PrimarySink::Jsonl(_) => OutputFormat::Jsonl,
            PrimarySink::Csv(_) => OutputFormat::Csv,
        }
    }

    pub fn write_sample(&mut self, sample: &SampleRecord) -> PipelineResult<()> {
        match self {
            PrimarySink::Jsonl(writer) => write_json_line(writer, sample),
            PrimarySink::Csv(csv) => {
                csv.serialize(sample)?;
                csv.flush()?;
                Ok(())
            }
        }
    }

    /// Writes the snapshot in JSON mode; CSV has no row shape for it.
    pub fn write_spectrum(&mut self, spectrum: &SpectralRecord) -> PipelineResult<bool> {
        match self {
            PrimarySink::Jsonl(writer) => write_json_line(writer, spectrum).map(|_| true),
            PrimarySink::Csv(_) => Ok(false),
        }
    }

    pub fn flush(&mut self) -> PipelineResult<()> {
        match self {
            PrimarySink::Jsonl(writer) => writer.flush()?,
            PrimarySink::Csv(csv) => csv.flush()?,
        }
        Ok(())
    }

    pub fn into_inner(self) -> PipelineResult<W> {
        match self {
            PrimarySink::Jsonl(writer) => Ok(writer),
            PrimarySink::Csv(csv) => csv.into_inner().map_err(|err| {
                PipelineError::Io(io::Error::new(err.error().kind(), err.error().to_string()))
            }),
        }
    }
}

fn write_json_line<W, T>(writer: &mut W, value: &T) -> PipelineResult<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
